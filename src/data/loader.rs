use std::fs;
use std::path::Path;

use crate::error::LoadError;
use crate::models::Question;

const BUILTIN_BANK: &str = include_str!("../../questions/english.json");

/// The bundled English question bank.
pub fn builtin_questions() -> Result<Vec<Question>, LoadError> {
    parse_questions(BUILTIN_BANK)
}

pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let questions = parse_questions(&json_content)?;
    tracing::info!(path = %path.display(), count = questions.len(), "question bank loaded");
    Ok(questions)
}

/// Parse and validate a bank; any bad record fails the whole bank.
pub fn parse_questions(json_content: &str) -> Result<Vec<Question>, LoadError> {
    let questions: Vec<Question> = serde_json::from_str(json_content)?;

    if questions.is_empty() {
        return Err(LoadError::Empty);
    }

    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|source| LoadError::InvalidQuestion { index, source })?;
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuestionError;

    #[test]
    fn test_builtin_bank_is_valid() {
        let questions = builtin_questions().unwrap();
        assert_eq!(questions.len(), 50);
        assert_eq!(questions[0].correct_option(), "Paris");
    }

    #[test]
    fn test_out_of_range_answer_fails_at_load() {
        let json = r#"[
            {"question":"ok","options":["a","b"],"correctAnswerIndex":1,"timeLimitSeconds":10},
            {"question":"bad","options":["a","b"],"correctAnswerIndex":2,"timeLimitSeconds":10}
        ]"#;
        match parse_questions(json) {
            Err(LoadError::InvalidQuestion { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source, QuestionError::CorrectIndexOutOfRange { index: 2, options: 2 });
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_malformed_banks() {
        assert!(matches!(parse_questions("[]"), Err(LoadError::Empty)));
        assert!(matches!(parse_questions("{"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_questions_from_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
