use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::question::Question;

/// Result for a single question of a finished sitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOutcome {
    pub question_index: usize,
    /// `None` when the question was never answered.
    pub selected_index: Option<usize>,
    pub correct_index: usize,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub correct_count: usize,
    pub total: usize,
    pub per_question: Vec<QuestionOutcome>,
}

impl ScoreReport {
    /// Unanswered questions count as incorrect.
    pub fn compute(questions: &[Question], answers: &BTreeMap<usize, usize>) -> Self {
        let per_question: Vec<QuestionOutcome> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let selected_index = answers.get(&index).copied();
                QuestionOutcome {
                    question_index: index,
                    selected_index,
                    correct_index: question.correct_index,
                    is_correct: selected_index == Some(question.correct_index),
                }
            })
            .collect();

        Self {
            correct_count: per_question.iter().filter(|o| o.is_correct).count(),
            total: questions.len(),
            per_question,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.correct_count as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}
