use std::path::PathBuf;

use crate::ai::{GenerationRequest, QuestionGenerator};
use crate::data::loader::{builtin_questions, load_questions_from_json};
use crate::error::{GenerationError, SourceError};
use crate::models::Question;

/// Where a question pool comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Builtin,
    File(PathBuf),
    Generated(GenerationRequest),
}

impl SourceConfig {
    pub fn label(&self) -> String {
        match self {
            SourceConfig::Builtin => "English".to_string(),
            SourceConfig::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            SourceConfig::Generated(request) => match &request.topic {
                Some(topic) => format!("{} / {}", request.subject, topic),
                None => request.subject.clone(),
            },
        }
    }
}

/// Supplies question pools, statically or through a generator.
#[derive(Clone, Default)]
pub struct QuestionSource {
    generator: Option<QuestionGenerator>,
}

impl QuestionSource {
    pub fn new(generator: Option<QuestionGenerator>) -> Self {
        Self { generator }
    }

    pub fn can_generate(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn get_pool(&self, config: &SourceConfig) -> Result<Vec<Question>, SourceError> {
        match config {
            SourceConfig::Builtin => Ok(builtin_questions()?),
            SourceConfig::File(path) => Ok(load_questions_from_json(path)?),
            SourceConfig::Generated(request) => {
                let generator = self.generator.as_ref().ok_or(GenerationError::Disabled)?;
                Ok(generator.generate(request).await?)
            }
        }
    }
}
