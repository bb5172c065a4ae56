//! Hosted chat-completion integration.
//!
//! Everything here talks to the service through [`ChatCompletion`], so the
//! quiz core never depends on HTTP directly.

pub mod client;
pub mod explain;
pub mod generator;
pub mod normalize;
pub mod scripted;
pub mod suggest;

pub use client::{AiConfig, ChatClient, ChatCompletion};
pub use explain::{ExplanationBoard, ExplanationFetcher, ExplanationState, Ticket};
pub use generator::{Difficulty, GenerationRequest, QuestionGenerator};
pub use scripted::ScriptedChat;
pub use suggest::Placeholders;
