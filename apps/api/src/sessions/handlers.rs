use std::path::Path as FsPath;

use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{MatchAnalysis, ResumeInfo};
use crate::documents::chunker::chunk_stats;
use crate::documents::parser::{parse_document, validate_upload, DocumentError, ParsedDocument};
use crate::errors::AppError;
use crate::sessions::{DocumentKind, StoredDocument};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub session_id: String,
    /// `{fileName, fileType, wordCount}`; the extracted text stays server-side.
    pub data: ParsedDocument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: MatchAnalysis,
    pub resume_info: ResumeInfo,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Fields of an upload form: `file` plus an optional `sessionId`.
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    session_id: Option<String>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("Invalid upload: {}", err.body_text()))
    }
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or(DocumentError::MissingFileName)?;
                let data = field.bytes().await.map_err(multipart_error)?;
                form.file = Some((file_name, data));
            }
            Some("sessionId") => {
                let value = field.text().await.map_err(multipart_error)?;
                form.session_id = Some(value.trim().to_string()).filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Deletes an upload; a failure is logged, never returned.
async fn remove_upload(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to delete upload {}: {e}", path.display());
    }
}

async fn store_upload(
    state: &AppState,
    kind: DocumentKind,
    session_id: String,
    file: Option<(String, Bytes)>,
) -> Result<UploadResponse, AppError> {
    let (file_name, data) = file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let file_type = validate_upload(&file_name, data.len(), state.config.max_file_size)?;
    let parsed = parse_document(&file_name, file_type, data.clone()).await?;

    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", upload_dir.display()))?;
    let path = upload_dir.join(format!("{}.{}", Uuid::new_v4(), file_type.extension()));
    tokio::fs::write(&path, &data)
        .await
        .with_context(|| format!("Failed to write upload {}", path.display()))?;

    let replaced = state
        .sessions
        .attach(
            &session_id,
            kind,
            StoredDocument {
                path,
                file_name: file_name.clone(),
                text: parsed.text.clone(),
            },
        )
        .await;
    if let Some(old) = replaced {
        remove_upload(&old.path).await;
    }

    info!(
        "{} '{file_name}' stored for session {session_id} ({} words)",
        kind.label(),
        parsed.word_count
    );
    Ok(UploadResponse {
        message: format!("{} uploaded successfully", kind.label()),
        session_id,
        data: parsed,
    })
}

/// POST /api/upload/resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let session_id = form
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let response = store_upload(&state, DocumentKind::Resume, session_id, form.file).await?;
    Ok(Json(response))
}

/// POST /api/upload/job-description
pub async fn handle_upload_job_description(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let session_id = form
        .session_id
        .ok_or_else(|| AppError::Validation("Session ID is required".to_string()))?;
    let response =
        store_upload(&state, DocumentKind::JobDescription, session_id, form.file).await?;
    Ok(Json(response))
}

/// POST /api/upload/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Session ID is required".to_string()))?;
    let (resume, job_description) = state.sessions.documents_for_analysis(&session_id).await?;

    let chunks = state.chunker.chunk_document(&resume, "resume");
    state.index.add_documents(&session_id, &chunks).await?;
    let stats = chunk_stats(&chunks);
    info!(
        "Indexed {} resume chunks (avg {} chars) for session {session_id} ({} strategy)",
        stats.total_chunks,
        stats.avg_chunk_size,
        state.index.strategy()
    );

    let analysis = state.analyzer.analyze(&resume, &job_description).await?;
    let resume_info = state.analyzer.extract_info(&resume).await;

    Ok(Json(AnalyzeResponse {
        analysis,
        resume_info,
        session_id,
    }))
}

/// DELETE /api/upload/session/:sessionId
pub async fn handle_clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<MessageResponse> {
    if let Some(session) = state.sessions.remove(&session_id).await {
        for path in session.paths() {
            remove_upload(path).await;
        }
        info!("Cleared session {session_id}");
    }
    state.index.delete_by_session(&session_id).await;
    state.conversations.clear_conversation(&session_id).await;

    Json(MessageResponse {
        message: "Session cleared".to_string(),
    })
}
