/// LLM Client — the single point of entry for all hosted-model calls.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI or Gemini APIs directly.
/// Analysis, chat and embedding search depend only on the traits defined here.
///
/// Every call is made at most once. A failed call surfaces to the request that made it.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

pub mod gemini;
pub mod openai;
pub mod prompts;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Embedding response had {got} vectors for {expected} inputs")]
    EmbeddingCount { expected: usize, got: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A hosted chat model. `history` excludes the system prompt and the new user message.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, LlmError>;
}

/// A hosted embedding model with a fixed output dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn model(&self) -> &str;

    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Calls the provider and deserializes the reply as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn complete_json<T: DeserializeOwned>(
    provider: &dyn CompletionProvider,
    system: &str,
    prompt: &str,
) -> Result<T, LlmError> {
    let text = provider.complete(system, &[], prompt).await?;
    parse_json_reply(&text)
}

/// Parses model output as JSON, tolerating markdown code fences.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
}

/// Models often wrap JSON replies in a markdown fence, with or without a `json` tag.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

pub(crate) fn http_client() -> Result<Client, LlmError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

/// Turns a non-success response into `LlmError::Api`, keeping the body as the message.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

// OpenAI and Gemini both wrap errors as {"error": {"message": ...}}
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;

    /// One recorded `complete` call.
    #[derive(Debug, Clone)]
    pub(crate) struct RecordedCall {
        pub system: String,
        pub history: Vec<ChatMessage>,
        pub user_message: String,
    }

    /// Replies with a fixed string (or fails when `reply` is `None`) and records every call.
    pub(crate) struct ScriptedProvider {
        reply: Option<String>,
        pub calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedProvider {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                reply: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn recorded(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            system: &str,
            history: &[ChatMessage],
            user_message: &str,
        ) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(RecordedCall {
                system: system.to_string(),
                history: history.to_vec(),
                user_message: user_message.to_string(),
            });
            self.reply.clone().ok_or(LlmError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            })
        }
    }

    #[test]
    fn test_fenced_reply_is_unwrapped() {
        let tagged = "```json\n{\"matchScore\": 70}\n```";
        let bare = "```\n{\"matchScore\": 70}\n```";
        assert_eq!(strip_json_fences(tagged), "{\"matchScore\": 70}");
        assert_eq!(strip_json_fences(bare), "{\"matchScore\": 70}");
    }

    #[test]
    fn test_unfenced_and_unterminated_replies() {
        assert_eq!(strip_json_fences("  {\"skills\": []} "), "{\"skills\": []}");
        assert_eq!(strip_json_fences("```json\n{\"skills\": []}"), "{\"skills\": []}");
    }

    #[test]
    fn test_parse_json_reply_rejects_prose() {
        let result: Result<Value, _> = parse_json_reply("Sure! Here is the analysis.");
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_chat_message_serializes_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }
}
