//! Gemini backend: `generateContent` and `batchEmbedContents`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_status, http_client, ChatMessage, CompletionProvider, EmbeddingProvider, LlmError, Role};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const CHAT_MODEL: &str = "gemini-1.5-flash";
pub const EMBEDDING_MODEL: &str = "text-embedding-004";
/// text-embedding-004 output size.
pub const EMBEDDING_DIMENSIONS: usize = 768;

const TEMPERATURE: f32 = 0.3;
const MAX_OUTPUT_TOKENS: u32 = 1000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }
}

fn text_content<'a>(role: Option<&'static str>, text: &'a str) -> Content<'a> {
    Content {
        role,
        parts: vec![Part { text }],
    }
}

fn build_generate_request<'a>(
    system: &'a str,
    history: &'a [ChatMessage],
    user_message: &'a str,
) -> GenerateRequest<'a> {
    // Gemini has no assistant role; prior answers go in as "model" turns
    let mut contents: Vec<Content<'a>> = history
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let role = if m.role == Role::Assistant { "model" } else { "user" };
            text_content(Some(role), &m.content)
        })
        .collect();
    contents.push(text_content(Some("user"), user_message));

    GenerateRequest {
        system_instruction: text_content(None, system),
        contents,
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
    }
}

fn candidate_text(response: GenerateResponse) -> Result<String, LlmError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(LlmError::EmptyContent)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    fn model(&self) -> &str {
        CHAT_MODEL
    }

    async fn complete(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, LlmError> {
        let request = build_generate_request(system, history, user_message);
        let response = self
            .client
            .post(format!("{API_BASE}/{CHAT_MODEL}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let body: GenerateResponse = check_status(response).await?.json().await?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini completion succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        candidate_text(body)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
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
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|t| EmbedRequest {
                    model: format!("models/{EMBEDDING_MODEL}"),
                    content: text_content(None, t),
                })
                .collect(),
        };
        let response = self
            .client
            .post(format!("{API_BASE}/{EMBEDDING_MODEL}:batchEmbedContents"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let body: BatchEmbedResponse = check_status(response).await?.json().await?;

        let vectors: Vec<Vec<f32>> = body.embeddings.into_iter().map(|e| e.values).collect();
        if vectors.len() != texts.len() {
            return Err(LlmError::EmbeddingCount {
                expected: texts.len(),
                got: vectors.len(),
            });
        }
        Ok(vectors)
    }
}
