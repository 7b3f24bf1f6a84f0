//! Answer backends for the conversation manager.
//!
//! `TemplateResponder` answers offline from the retrieved chunks; `LlmResponder`
//! sends the grounding context, the prior exchanges and the question to a
//! `CompletionProvider`. Chosen once at startup alongside the analyzer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};

use super::prompts::RAG_SYSTEM_TEMPLATE;
use super::templates::template_answer;
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{ChatMessage, CompletionProvider, LlmError};
use crate::search::SearchResult;

/// Everything a backend may use to answer one question.
pub struct AnswerRequest<'a> {
    pub question: &'a str,
    /// Rendered `[Source i]` blocks, or the no-results sentence.
    pub context: &'a str,
    pub results: &'a [SearchResult],
    /// Prior messages, oldest first.
    pub history: &'a [ChatMessage],
}

#[async_trait]
pub trait Responder: Send + Sync {
    fn backend(&self) -> String;

    async fn answer(&self, request: AnswerRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Default)]
pub struct TemplateResponder;

#[async_trait]
impl Responder for TemplateResponder {
    fn backend(&self) -> String {
        "template".to_string()
    }

    async fn answer(&self, request: AnswerRequest<'_>) -> Result<String, LlmError> {
        Ok(template_answer(
            request.question,
            request.results,
            Utc::now().year(),
        ))
    }
}

pub struct LlmResponder {
    provider: Arc<dyn CompletionProvider>,
}

impl LlmResponder {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Responder for LlmResponder {
    fn backend(&self) -> String {
        format!("llm:{}", self.provider.model())
    }

    async fn answer(&self, request: AnswerRequest<'_>) -> Result<String, LlmError> {
        let system = fill_template(RAG_SYSTEM_TEMPLATE, &[("context", request.context)]);
        self.provider
            .complete(&system, request.history, request.question)
            .await
    }
}
