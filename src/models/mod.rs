mod question;
mod score;
mod session;

pub use question::{MAX_OPTIONS, MIN_OPTIONS, Question};
pub use score::{QuestionOutcome, ScoreReport};
pub use session::{Advance, Expiry, Operation, Phase, Session, SessionSettings, TimerMode};
