//! FILENAME: app/server/src/routes.rs
// PURPOSE: HTTP routes of the exporter.

use crate::api_types::ExportRequest;
use crate::error::ExportError;
use crate::export::prepare_export;
use crate::stream::stream_export;
use crate::{log_debug, log_info};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use recorder::RecorderApi;
use std::sync::Arc;

/// Shared by every request. The recorder connection is the only resource
/// requests have in common.
#[derive(Clone)]
pub struct AppState {
    pub recorder: Arc<dyn RecorderApi>,
}

impl AppState {
    pub fn new(recorder: Arc<dyn RecorderApi>) -> Self {
        AppState { recorder }
    }
}

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/export", post(export))
        .route("/api/entities", get(entities))
        .with_state(state)
}

async fn export(State(state): State<AppState>, body: Bytes) -> Result<Response, ExportError> {
    let params = ExportRequest::from_json(&body)?.validate()?;
    log_info!(
        "HTTP",
        "POST /api/export entities={} start={} end={} period={} format={}",
        params.entities.len(),
        params.start.to_rfc3339(),
        params.end.to_rfc3339(),
        params.period,
        params.format.extension()
    );

    let prepared = prepare_export(state.recorder.as_ref(), &params).await?;
    let content_type = prepared.format.content_type().to_string();
    let disposition = format!("attachment; filename=\"{}\"", prepared.file_name());

    let body = stream_export(prepared).await?;
    Ok((
        [(CONTENT_TYPE, content_type), (CONTENT_DISPOSITION, disposition)],
        body,
    )
        .into_response())
}

async fn entities(State(state): State<AppState>) -> Result<Json<Vec<String>>, ExportError> {
    let ids = state.recorder.entity_ids().await?;
    log_debug!("HTTP", "GET /api/entities count={}", ids.len());
    Ok(Json(ids))
}
