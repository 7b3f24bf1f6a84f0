//! OpenAI backend: chat completions and embeddings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_status, http_client, ChatMessage, CompletionProvider, EmbeddingProvider, LlmError, Role};

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

pub const CHAT_MODEL: &str = "gpt-4o-mini";
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// text-embedding-3-small output size.
pub const EMBEDDING_DIMENSIONS: usize = 1536;

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }
}

fn build_chat_request<'a>(
    system: &'a str,
    history: &'a [ChatMessage],
    user_message: &'a str,
) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(WireMessage {
        role: Role::System,
        content: system,
    });
    messages.extend(history.iter().map(|m| WireMessage {
        role: m.role,
        content: &m.content,
    }));
    messages.push(WireMessage {
        role: Role::User,
        content: user_message,
    });
    ChatRequest {
        model: CHAT_MODEL,
        messages,
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LlmError::EmptyContent)
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn model(&self) -> &str {
        CHAT_MODEL
    }

    async fn complete(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, LlmError> {
        let request = build_chat_request(system, history, user_message);
        let response = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let body: ChatResponse = check_status(response).await?.json().await?;

        if let Some(usage) = &body.usage {
            debug!(
                "OpenAI completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        first_choice_text(body)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    fn model(&self) -> &str {
        EMBEDDING_MODEL
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or(LlmError::EmbeddingCount {
            expected: 1,
            got: 0,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: texts,
        };
        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let body: EmbeddingResponse = check_status(response).await?.json().await?;

        let vectors: Vec<Vec<f32>> = body.data.into_iter().map(|d| d.embedding).collect();
        if vectors.len() != texts.len() {
            return Err(LlmError::EmbeddingCount {
                expected: texts.len(),
                got: vectors.len(),
            });
        }
        Ok(vectors)
    }
}
