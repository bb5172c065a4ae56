use serde::{Deserialize, Serialize};

use crate::error::QuestionError;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 5;

/// A single multiple-choice question.
///
/// Field names on disk and on the wire follow the generated-quiz format
/// (`question`, `options`, `correctAnswerIndex`, `timeLimitSeconds`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswerIndex")]
    pub correct_index: usize,
    #[serde(rename = "timeLimitSeconds")]
    pub time_limit_seconds: u32,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        correct_index: usize,
        time_limit_seconds: u32,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_index,
            time_limit_seconds,
        }
    }

    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&self.options.len()) {
            return Err(QuestionError::OptionCount(self.options.len()));
        }
        if self.correct_index >= self.options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: self.correct_index,
                options: self.options.len(),
            });
        }
        if self.time_limit_seconds == 0 {
            return Err(QuestionError::ZeroTimeLimit);
        }
        Ok(())
    }

    pub fn is_valid_option(&self, option: usize) -> bool {
        option < self.options.len()
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new("2 + 2?", ["3", "4", "5"], 1, 30)
    }

    #[test]
    fn test_valid_question() {
        assert_eq!(sample().validate(), Ok(()));
        assert_eq!(sample().correct_option(), "4");
    }

    #[test]
    fn test_rejects_bad_records() {
        let mut q = sample();
        q.correct_index = 3;
        assert_eq!(
            q.validate(),
            Err(QuestionError::CorrectIndexOutOfRange { index: 3, options: 3 })
        );

        let mut q = sample();
        q.options = vec!["only".into()];
        assert_eq!(q.validate(), Err(QuestionError::OptionCount(1)));

        let mut q = sample();
        q.options = (0..6).map(|i| i.to_string()).collect();
        assert_eq!(q.validate(), Err(QuestionError::OptionCount(6)));

        let mut q = sample();
        q.time_limit_seconds = 0;
        assert_eq!(q.validate(), Err(QuestionError::ZeroTimeLimit));

        let mut q = sample();
        q.text = "   ".into();
        assert_eq!(q.validate(), Err(QuestionError::EmptyText));
    }

    #[test]
    fn test_wire_field_names() {
        let json = r#"{"question":"Q","options":["a","b"],"correctAnswerIndex":0,"timeLimitSeconds":20}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q, Question::new("Q", ["a", "b"], 0, 20));

        let back = serde_json::to_string(&q).unwrap();
        assert!(back.contains("\"correctAnswerIndex\":0"));
    }
}
