//! Post-hoc explanations for answered questions.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::ai::client::ChatCompletion;
use crate::error::GenerationError;
use crate::models::Question;

pub fn explanation_prompt(question: &Question, selected: Option<usize>) -> String {
    let mut prompt = format!(
        "Provide a detailed explanation for the following quiz question:\n\n\
         Question: {}\nOptions: {}\nCorrect Answer: {}.",
        question.text,
        question.options.join(", "),
        question.correct_option(),
    );

    match selected.and_then(|i| question.options.get(i).map(|text| (i, text))) {
        Some((index, text)) if index != question.correct_index => {
            prompt.push_str(&format!(
                "\n\nYour selected answer was \"{text}\", which was incorrect. \
                 Please explain why the correct answer is right and why your selected answer was wrong."
            ));
        }
        Some(_) => {
            prompt.push_str("\n\nYou answered this correctly. Explain why this is the correct answer.");
        }
        None => {}
    }

    prompt.push_str("\n\nKeep the explanation concise and to the point.");
    prompt
}

#[derive(Clone)]
pub struct ExplanationFetcher {
    chat: Arc<dyn ChatCompletion>,
}

impl ExplanationFetcher {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat }
    }

    pub async fn explain(
        &self,
        question: &Question,
        selected: Option<usize>,
    ) -> Result<String, GenerationError> {
        let text = self.chat.complete(&explanation_prompt(question, selected)).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// Identifies one explanation request for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub question_index: usize,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationState {
    Loading(Uuid),
    Ready(String),
    Failed(String),
}

/// Per-question explanation slots.
///
/// Responses are matched by ticket, so a late reply can only land on the
/// question it was requested for, and only while that request is current.
#[derive(Debug, Default)]
pub struct ExplanationBoard {
    entries: HashMap<usize, ExplanationState>,
}

impl ExplanationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `question_index` as loading; `None` if it already is.
    pub fn request(&mut self, question_index: usize) -> Option<Ticket> {
        if self.is_loading(question_index) {
            return None;
        }
        let id = Uuid::new_v4();
        self.entries.insert(question_index, ExplanationState::Loading(id));
        Some(Ticket { question_index, id })
    }

    /// Apply a response; returns false when the ticket is stale.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<String, GenerationError>) -> bool {
        match self.entries.get(&ticket.question_index) {
            Some(ExplanationState::Loading(id)) if *id == ticket.id => {}
            _ => {
                tracing::warn!(question = ticket.question_index, "discarding stale explanation");
                return false;
            }
        }

        let state = match result {
            Ok(text) => ExplanationState::Ready(text),
            Err(err) => {
                tracing::error!(question = ticket.question_index, error = %err, "explanation failed");
                ExplanationState::Failed(err.to_string())
            }
        };
        self.entries.insert(ticket.question_index, state);
        true
    }

    pub fn get(&self, question_index: usize) -> Option<&ExplanationState> {
        self.entries.get(&question_index)
    }

    pub fn is_loading(&self, question_index: usize) -> bool {
        matches!(self.entries.get(&question_index), Some(ExplanationState::Loading(_)))
    }

    /// Forget everything; in-flight responses become stale.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
