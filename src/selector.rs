//! Draws the questions for one sitting.

use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use crate::models::Question;

/// Draw `min(count, pool.len())` distinct questions in random order.
pub fn select(pool: &[Question], count: usize) -> Vec<Question> {
    select_with(pool, count, &mut rng())
}

/// Same as [`select`] with a caller-provided random source.
pub fn select_with<R: Rng + ?Sized>(pool: &[Question], count: usize, rng: &mut R) -> Vec<Question> {
    let mut drawn = pool.to_vec();
    drawn.as_mut_slice().shuffle(rng);
    drawn.truncate(count);
    tracing::debug!(pool = pool.len(), drawn = drawn.len(), "questions selected");
    drawn
}
