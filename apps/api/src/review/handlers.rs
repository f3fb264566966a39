//! Axum route handlers for the Review API.

use std::convert::Infallible;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::review::ingest::Document;
use crate::review::models::{ReviewRecord, ReviewReport};
use crate::review::presenter::{present, ProgressEvent, TracingPresenter};
use crate::state::AppState;

/// Multipart field carrying the uploaded document.
const FILE_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub source_name: String,
    pub source_text: String,
}

impl ReviewRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.source_text.trim().is_empty() {
            return Err(AppError::Validation(
                "source_text cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/reviews
///
/// Runs the full review on already-extracted text and returns the final record.
/// Stage failures are reported in `errors`, never as an HTTP error.
pub async fn handle_review(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewRecord>, AppError> {
    request.validate()?;

    let mut presenter = TracingPresenter::default();
    let snapshots = state
        .pipeline
        .run_streaming(request.source_name, request.source_text);
    let record = present(snapshots, &mut presenter)
        .await
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("review produced no snapshot")))?;

    Ok(Json(record))
}

/// POST /api/v1/reviews/upload
///
/// Multipart upload (field `file`). The document is converted to text before
/// the pipeline starts; unsupported or empty files are rejected with no record.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ReviewRecord>, AppError> {
    let document = read_document(multipart).await?;
    let (name, text) = state.adapter.process(&document)?;
    info!("Reviewing upload {name} ({} chars)", text.len());

    Ok(Json(state.pipeline.run(name, text).await))
}

/// POST /api/v1/reviews/report
///
/// Same as `/reviews` but returns the downloadable report document.
pub async fn handle_report(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let record = state
        .pipeline
        .run(request.source_name, request.source_text)
        .await;
    let report = ReviewReport::from(&record);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(&report.download_name())
    );

    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(report)))
}

/// POST /api/v1/reviews/stream
///
/// Multipart upload (field `file`) answered with Server-Sent Events: one
/// `snapshot` event per pipeline yield point. Conversion failures arrive as a
/// `failed` snapshot rather than an HTTP error.
pub async fn handle_stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let document = read_document(multipart).await?;
    let events = state
        .pipeline
        .run_document_streaming(state.adapter.clone(), document)
        .map(|record| Ok(snapshot_event(&record)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_document(mut multipart: Multipart) -> Result<Document, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        return Ok(Document::new(file_name, content));
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

fn snapshot_event(record: &ReviewRecord) -> Event {
    match Event::default()
        .event("snapshot")
        .json_data(ProgressEvent::from(record))
    {
        Ok(event) => event,
        Err(e) => {
            warn!("SSE: Failed to serialize snapshot: {e}");
            Event::default().event("error").data(e.to_string())
        }
    }
}

/// Keeps header-safe characters only.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
