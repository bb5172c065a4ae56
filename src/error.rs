//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{Operation, Phase};

/// A question record that breaks the question invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,
    #[error("question has {0} options, expected between 2 and 5")]
    OptionCount(usize),
    #[error("correct answer index {index} is out of range for {options} options")]
    CorrectIndexOutOfRange { index: usize, options: usize },
    #[error("time limit must be at least one second")]
    ZeroTimeLimit,
}

/// Errors raised while loading a static question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question bank must contain at least one question")]
    Empty,
    #[error("question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// Failures of the hosted chat-completion service or of its payload.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("AI generation is not configured (set QUIZ_AI_API_KEY)")]
    Disabled,
    #[error("AI service returned an empty response")]
    EmptyResponse,
    #[error("AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("AI response is not valid quiz data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("AI response did not contain any questions")]
    NoQuestions,
    #[error("AI returned {actual} questions but {expected} were requested")]
    TooFewQuestions { expected: usize, actual: usize },
    #[error("AI question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// A session operation called outside its valid phase or with bad input.
///
/// A rejected operation never changes the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("`{operation}` is not allowed while the session is {phase}")]
    WrongPhase { operation: Operation, phase: Phase },
    #[error("option {option} is out of range for a question with {available} options")]
    OptionOutOfRange { option: usize, available: usize },
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("going back is disabled for this session")]
    BackDisabled,
    #[error("cannot begin a session without questions")]
    NoQuestions,
}

/// Errors from the drawn-question snapshot handoff.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("no drawn question set at {} (run `timed-quiz draw` first)", path.display())]
    Missing { path: PathBuf },
    #[error("drawn question set at {} is unusable: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error("failed to write drawn question set to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors from building a question pool.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Failed to load questions: {0}")]
    Source(#[from] SourceError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<LoadError> for QuizError {
    fn from(err: LoadError) -> Self {
        QuizError::Source(SourceError::Load(err))
    }
}

impl From<GenerationError> for QuizError {
    fn from(err: GenerationError) -> Self {
        QuizError::Source(SourceError::Generation(err))
    }
}
