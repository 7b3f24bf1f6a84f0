use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::chat::RagResponse;
use crate::errors::AppError;
use crate::llm_client::ChatMessage;
use crate::search::{SearchFilter, SearchResult};
use crate::sessions::handlers::MessageResponse;
use crate::state::AppState;

const DEFAULT_SEARCH_TOP_K: usize = 5;
const MAX_SEARCH_TOP_K: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub history: Vec<ChatMessage>,
    pub message_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/chat
/// The session id doubles as the conversation id.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<RagResponse>, AppError> {
    let (Some(question), Some(session_id)) = (non_blank(req.question), non_blank(req.session_id))
    else {
        return Err(AppError::Validation(
            "Question and session ID are required".to_string(),
        ));
    };
    let response = state
        .conversations
        .query(question.trim(), &session_id, &session_id)
        .await?;
    Ok(Json(response))
}

/// GET /api/chat/history/:sessionId
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
    let history = state.conversations.history(&session_id).await;
    Json(HistoryResponse {
        message_count: history.len(),
        history,
    })
}

/// DELETE /api/chat/history/:sessionId
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<MessageResponse> {
    state.conversations.clear_conversation(&session_id).await;
    Json(MessageResponse {
        message: "Conversation history cleared".to_string(),
    })
}

/// POST /api/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let query = non_blank(req.query)
        .ok_or_else(|| AppError::Validation("Query is required".to_string()))?;
    let top_k = req
        .top_k
        .unwrap_or(DEFAULT_SEARCH_TOP_K)
        .min(MAX_SEARCH_TOP_K);
    let filter = non_blank(req.session_id).map(|id| SearchFilter::session(&id));

    let results = state.index.search(&query, top_k, filter.as_ref()).await?;
    Ok(Json(results))
}
