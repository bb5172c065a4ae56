//! Handoff of a drawn question set between `draw` and `take`.
//!
//! The set is written once, atomically, and read exactly once: `take`
//! removes the file so a sitting can never be replayed from a stale draw.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::models::Question;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Human-readable origin of the set, e.g. the bank or subject.
    pub label: String,
    pub questions: Vec<Question>,
}

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, set: &QuestionSet) -> Result<(), SnapshotError> {
        let write_err = |source: io::Error| SnapshotError::Write {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_vec_pretty(set).map_err(|e| write_err(io::Error::other(e)))?;
        let staging = self.path.with_extension("partial");
        fs::write(&staging, json).map_err(write_err)?;
        fs::rename(&staging, &self.path).map_err(write_err)?;

        tracing::info!(
            path = %self.path.display(),
            questions = set.questions.len(),
            "question set written"
        );
        Ok(())
    }

    /// Read the set and remove it.
    pub fn take(&self) -> Result<QuestionSet, SnapshotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(SnapshotError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(err) => return Err(self.corrupt(err.to_string())),
        };

        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %err, "could not remove consumed question set");
        }

        let set: QuestionSet =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        if set.questions.is_empty() {
            return Err(self.corrupt("it contains no questions".to_string()));
        }
        for (index, question) in set.questions.iter().enumerate() {
            question
                .validate()
                .map_err(|e| self.corrupt(format!("question {index}: {e}")))?;
        }

        tracing::info!(path = %self.path.display(), questions = set.questions.len(), "question set loaded");
        Ok(set)
    }

    fn corrupt(&self, reason: String) -> SnapshotError {
        SnapshotError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> SnapshotStore {
        let name = format!("timed-quiz-snapshot-{}.json", uuid::Uuid::new_v4());
        SnapshotStore::new(std::env::temp_dir().join(name))
    }

    fn set() -> QuestionSet {
        QuestionSet {
            label: "English".into(),
            questions: vec![Question::new("Q", ["a", "b"], 1, 20)],
        }
    }

    #[test]
    fn test_write_then_take_once() {
        let store = temp_store();
        store.write(&set()).unwrap();
        assert_eq!(store.take().unwrap(), set());
        assert!(matches!(store.take(), Err(SnapshotError::Missing { .. })));
    }

    #[test]
    fn test_missing_snapshot() {
        let store = temp_store();
        assert!(matches!(store.take(), Err(SnapshotError::Missing { .. })));
    }

    #[test]
    fn test_corrupt_snapshot() {
        let store = temp_store();
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.take(), Err(SnapshotError::Corrupt { .. })));

        fs::write(store.path(), r#"{"label":"x","questions":[]}"#).unwrap();
        assert!(matches!(store.take(), Err(SnapshotError::Corrupt { .. })));
    }
}
