//! FILENAME: app/server/src/error.rs
// PURPOSE: Error taxonomy of one export request and its HTTP mapping.

use crate::api_types::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use persistence::PersistenceError;
use pivot_engine::PivotError;
use recorder::RecorderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    Validation(String),

    #[error("recorder query failed: {0}")]
    Upstream(#[from] RecorderError),

    #[error("no statistics found for the requested entities and range")]
    NoData,

    #[error("export failed: {0}")]
    Serialization(#[from] PersistenceError),
}

impl ExportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExportError::Validation(_) => StatusCode::BAD_REQUEST,
            ExportError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ExportError::NoData => StatusCode::NOT_FOUND,
            ExportError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PivotError> for ExportError {
    fn from(e: PivotError) -> Self {
        match e {
            PivotError::NoData => ExportError::NoData,
            // Pivot output is always sorted and non-empty.
            PivotError::Table(e) => ExportError::Serialization(PersistenceError::Io(
                std::io::Error::other(e.to_string()),
            )),
        }
    }
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!(target: "HTTP", "{} {}", status.as_u16(), self);
        } else {
            log::warn!(target: "HTTP", "{} {}", status.as_u16(), self);
        }
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
