// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP surface for the document QA service
//!
//! Routes:
//! - `GET  /`                 liveness message
//! - `POST /upload`           multipart PDF upload, chunk + index + persist
//! - `POST /chat`             retrieval-augmented answer for a session
//! - `POST /clear-history`    drop one session's conversation
//! - `POST /delete-documents` drop the session and wipe the shared index

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::errors::ApiError;
use crate::config::ServiceConfig;
use crate::rag::chunker::{self, ChunkerConfig};
use crate::rag::{AnswerEngine, ConversationStore, RagError};
use crate::vector::IndexManager;

/// Upload size cap (50MB)
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConversationStore>,
    pub index: Arc<IndexManager>,
    pub engine: Arc<AnswerEngine>,
    pub chunker: ChunkerConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub chunks: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub source_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Build the service router over shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/upload", post(upload_handler))
        .route("/chat", post(chat_handler))
        .route("/clear-history", post(clear_history_handler))
        .route("/delete-documents", post(delete_documents_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn start_server(state: AppState, config: &ServiceConfig) -> anyhow::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Document QA API listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    Json(MessageResponse {
        message: "RAG Chat Application API".to_string(),
    })
}

async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiErrorResponse> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut session_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::InvalidRequest("Missing filename".to_string()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Upload read failed: {}", e)))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("session_id") => {
                session_id = field.text().await.ok().filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::InvalidRequest("Missing file field".to_string()))?;

    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::ValidationError {
            field: "file".to_string(),
            message: "Only PDFs allowed".to_string(),
        }
        .into());
    }

    let name = chunker::document_name(&filename);
    let chunker_config = state.chunker;

    // PDF parsing is CPU-bound, keep it off the async workers
    let parse_name = name.clone();
    let chunks = tokio::task::spawn_blocking(move || {
        chunker::split_pdf(&parse_name, &bytes, chunker_config)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Chunking task failed: {}", e)))?
    .map_err(ApiError::from)?;

    let total_pages = chunks.first().map(|c| c.metadata.total_pages).unwrap_or(0);
    let count = state
        .index
        .index_chunks(&chunks)
        .await
        .map_err(ApiError::from)?;

    if let Some(session_id) = session_id {
        state
            .store
            .store_document_summary(
                &session_id,
                &name,
                &format!("Indexed {} chunks across {} pages", count, total_pages),
            )
            .await;
    }

    tracing::info!("Indexed '{}': {} chunks", name, count);

    Ok(Json(UploadResponse {
        message: "Indexed PDF".to_string(),
        chunks: count,
    }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiErrorResponse> {
    if request.question.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: "question".to_string(),
            message: "Question must not be empty".to_string(),
        }
        .into());
    }

    let answer = state
        .engine
        .answer(&request.session_id, &request.question)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ChatResponse {
        answer: answer.text,
        source_count: answer.source_count,
    }))
}

async fn clear_history_handler(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Json<MessageResponse> {
    state.store.clear_session(&request.session_id).await;
    Json(MessageResponse {
        message: "History cleared successfully".to_string(),
    })
}

async fn delete_documents_handler(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    state.store.clear_session(&request.session_id).await;
    state.index.clear().await.map_err(ApiError::from)?;

    Ok(Json(MessageResponse {
        message: "Documents and history deleted successfully".to_string(),
    }))
}

/// Error wrapper carrying the status code into the response
pub struct ApiErrorResponse(pub ApiError);

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<RagError> for ApiErrorResponse {
    fn from(err: RagError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.to_response())).into_response()
    }
}
