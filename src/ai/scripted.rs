use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::client::ChatCompletion;
use crate::error::GenerationError;

/// Chat service that replays canned replies in order.
///
/// Stands in for the hosted endpoint in tests. Once the
/// script runs out every call fails with `EmptyResponse`.
#[derive(Debug, Default)]
pub struct ScriptedChat {
    replies: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChat {
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Some(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply that comes back empty.
    pub fn then_empty(self) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(None);
        }
        self
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .flatten();
        reply
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}
