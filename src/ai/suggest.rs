use crate::ai::client::ChatCompletion;

pub const SUBJECT_FALLBACK: &str = "e.g., Science, History, Math";
pub const TOPIC_FALLBACK: &str = "e.g., Quantum Physics, World War II";

const SUBJECT_PROMPT: &str = "Provide 3-5 diverse examples of general quiz subjects \
    (e.g., 'Science', 'History', 'Math', 'Literature', 'Geography'). \
    Return as a comma-separated list of strings.";
const TOPIC_PROMPT: &str = "Provide 3-5 diverse examples of specific topics within a general subject \
    (e.g., 'Quantum Physics', 'World War II', 'Algebra', 'Shakespearean Sonnets', 'Volcanoes'). \
    Return as a comma-separated list of strings.";

/// Example text shown in the empty subject and topic fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub subject: String,
    pub topic: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            subject: SUBJECT_FALLBACK.to_string(),
            topic: TOPIC_FALLBACK.to_string(),
        }
    }
}

pub fn parse_examples(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().trim_matches(|c: char| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn as_placeholder(examples: &[String]) -> Option<String> {
    (!examples.is_empty()).then(|| format!("e.g., {}", examples.join(", ")))
}

/// Ask the service for example subjects and topics.
///
/// Each half falls back to the static text on any failure.
pub async fn suggest_placeholders(chat: &dyn ChatCompletion) -> Placeholders {
    let mut placeholders = Placeholders::default();

    match chat.complete(SUBJECT_PROMPT).await {
        Ok(raw) => {
            if let Some(text) = as_placeholder(&parse_examples(&raw)) {
                placeholders.subject = text;
            }
        }
        Err(err) => tracing::warn!(error = %err, "subject suggestions unavailable"),
    }

    match chat.complete(TOPIC_PROMPT).await {
        Ok(raw) => {
            if let Some(text) = as_placeholder(&parse_examples(&raw)) {
                placeholders.topic = text;
            }
        }
        Err(err) => tracing::warn!(error = %err, "topic suggestions unavailable"),
    }

    placeholders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::scripted::ScriptedChat;

    #[test]
    fn test_parse_examples() {
        assert_eq!(
            parse_examples(" 'Art', Biology ,, \"Chess\" , "),
            vec!["Art", "Biology", "Chess"]
        );
        assert!(parse_examples(" , ").is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_with_fallback() {
        let chat = ScriptedChat::replying(["Astronomy, Music"]).then_empty();
        let placeholders = suggest_placeholders(&chat).await;
        assert_eq!(placeholders.subject, "e.g., Astronomy, Music");
        assert_eq!(placeholders.topic, TOPIC_FALLBACK);
        assert_eq!(chat.prompts().len(), 2);
    }
}
