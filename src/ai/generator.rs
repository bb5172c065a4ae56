use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::ai::client::ChatCompletion;
use crate::ai::normalize::strip_wrapper;
use crate::error::GenerationError;
use crate::models::Question;

pub const MIN_GENERATED: usize = 1;
pub const MAX_GENERATED: usize = 20;
pub const DEFAULT_GENERATED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Professional,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Professional,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Professional => "professional",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let index = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty `{s}`"))
    }
}

/// Parameters for one generated quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub subject: String,
    pub topic: Option<String>,
    pub count: usize,
    pub difficulty: Difficulty,
}

impl GenerationRequest {
    pub fn new(subject: impl Into<String>, count: usize, difficulty: Difficulty) -> Self {
        Self {
            subject: subject.into(),
            topic: None,
            count: count.clamp(MIN_GENERATED, MAX_GENERATED),
            difficulty,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        let topic = topic.into();
        self.topic = (!topic.trim().is_empty()).then_some(topic);
        self
    }

    pub fn prompt(&self) -> String {
        let focus = match &self.topic {
            Some(topic) => format!("Focus specifically on the topic of \"{}\".\n", topic.trim()),
            None => String::new(),
        };
        format!(
            "Generate {count} multiple-choice quiz questions on the subject of \"{subject}\".\n\
             {focus}\
             The difficulty level should be \"{difficulty}\".\n\
             Each question should have 3 to 5 options.\n\
             For each question, also provide an appropriate time limit in seconds (e.g., 20, 30, 45, 60) based on its length and difficulty.\n\
             The response MUST be a JSON array of objects, where each object has the following properties:\n\
             - \"question\": a string containing the quiz question.\n\
             - \"options\": an array of strings for the multiple-choice options.\n\
             - \"correctAnswerIndex\": a number (0-indexed) indicating the correct option.\n\
             - \"timeLimitSeconds\": a number for the time limit for this specific question.\n\
             Ensure the JSON is perfectly formatted and does not contain any leading/trailing text or comments.",
            count = self.count,
            subject = self.subject.trim(),
            difficulty = self.difficulty,
        )
    }
}

/// Parse model output into exactly-validated questions.
///
/// Partial results are never returned: one bad record, or fewer records than
/// `expected`, fails the whole payload.
pub fn parse_generated(raw: &str, expected: usize) -> Result<Vec<Question>, GenerationError> {
    let payload = strip_wrapper(raw);
    let questions: Vec<Question> = serde_json::from_str(payload)?;

    if questions.is_empty() {
        return Err(GenerationError::NoQuestions);
    }
    if questions.len() < expected {
        return Err(GenerationError::TooFewQuestions {
            expected,
            actual: questions.len(),
        });
    }
    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|source| GenerationError::InvalidQuestion { index, source })?;
    }
    Ok(questions)
}

/// Builds question pools through a chat-completion service.
#[derive(Clone)]
pub struct QuestionGenerator {
    chat: Arc<dyn ChatCompletion>,
}

impl QuestionGenerator {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GenerationError> {
        tracing::info!(
            subject = %request.subject,
            topic = ?request.topic,
            count = request.count,
            difficulty = %request.difficulty,
            "generating questions"
        );
        let raw = self.chat.complete(&request.prompt()).await?;
        match parse_generated(&raw, request.count) {
            Ok(questions) => {
                tracing::info!(count = questions.len(), "generated questions accepted");
                Ok(questions)
            }
            Err(err) => {
                tracing::error!(error = %err, raw_len = raw.len(), "generated questions rejected");
                Err(err)
            }
        }
    }
}
