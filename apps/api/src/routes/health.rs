use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::search::IndexStats;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub search_engine: IndexStats,
    pub analysis_backend: String,
    pub chat_backend: String,
    pub active_sessions: usize,
}

/// GET /api/health
/// Reports the configured backends and what is currently held in memory.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        search_engine: state.index.stats().await,
        analysis_backend: state.analyzer.backend(),
        chat_backend: state.conversations.responder_backend(),
        active_sessions: state.sessions.len().await,
    })
}
