pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::sessions::handlers as upload;
use crate::state::AppState;

/// Room for multipart boundaries and the other form fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + MULTIPART_OVERHEAD;

    Router::new()
        .route("/api/health", get(health::health_handler))
        // Uploads and analysis
        .route("/api/upload/resume", post(upload::handle_upload_resume))
        .route(
            "/api/upload/job-description",
            post(upload::handle_upload_job_description),
        )
        .route("/api/upload/analyze", post(upload::handle_analyze))
        .route(
            "/api/upload/session/:session_id",
            delete(upload::handle_clear_session),
        )
        // Chat and retrieval
        .route("/api/chat", post(chat::handle_chat))
        .route(
            "/api/chat/history/:session_id",
            get(chat::handle_get_history).delete(chat::handle_clear_history),
        )
        .route("/api/search", post(chat::handle_search))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
