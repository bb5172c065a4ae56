use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemma-3-27b-it:free";

/// A single-turn chat completion: one user prompt in, one text out.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Sent as `HTTP-Referer` for provider attribution.
    pub referer: Option<String>,
    /// Sent as `X-Title` for provider attribution.
    pub title: Option<String>,
}

impl AiConfig {
    /// Read settings from `QUIZ_AI_*` variables; `None` without an API key.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("QUIZ_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("QUIZ_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key,
            model,
            referer: env::var("QUIZ_AI_REFERER").ok(),
            title: env::var("QUIZ_AI_TITLE").ok(),
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: Option<AiConfig>,
}

impl ChatClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(AiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<AiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        let mut request = self
            .client
            .post(config.completions_url())
            .bearer_auth(&config.api_key)
            .json(&payload);
        if let Some(referer) = &config.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &config.title {
            request = request.header("X-Title", title);
        }

        tracing::debug!(model = %config.model, prompt_len = prompt.len(), "sending chat completion");
        let response = request.send().await?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "chat completion rejected");
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        extract_content(body)
    }
}

fn extract_content(body: ChatResponse) -> Result<String, GenerationError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(GenerationError::EmptyResponse)?;
    Ok(content)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_choice() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  hello \n"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(body).unwrap(), "hello");
    }

    #[test]
    fn test_empty_or_missing_content() {
        for raw in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
        ] {
            let body: ChatResponse = serde_json::from_str(raw).unwrap();
            assert!(matches!(extract_content(body), Err(GenerationError::EmptyResponse)));
        }
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let config = AiConfig {
            base_url: "https://example.test/v1/".into(),
            api_key: "k".into(),
            model: DEFAULT_MODEL.into(),
            referer: None,
            title: None,
        };
        assert_eq!(config.completions_url(), "https://example.test/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_disabled_client() {
        let client = ChatClient::new(None);
        assert!(!client.enabled());
        assert!(matches!(client.complete("hi").await, Err(GenerationError::Disabled)));
    }
}
