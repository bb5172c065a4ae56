mod loader;
mod snapshot;
mod source;

pub use loader::{builtin_questions, load_questions_from_json, parse_questions};
pub use snapshot::{QuestionSet, SnapshotStore};
pub use source::{QuestionSource, SourceConfig};
