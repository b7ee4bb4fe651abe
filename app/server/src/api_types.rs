//! FILENAME: app/server/src/api_types.rs
// PURPOSE: Request and response types of the HTTP API.
// CONTEXT: Bodies are decoded by hand so that every malformed request maps to
// the same 400 `{code, message}` shape.

use crate::error::ExportError;
use chrono::{DateTime, Utc};
use engine::Period;
use persistence::ExportFormat;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/export`, as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub entities: Vec<String>,
    pub start: String,
    pub end: String,
    pub period: Period,
    #[serde(default)]
    pub format: ExportFormat,
}

/// A request that passed validation; the pipeline trusts these fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportParams {
    pub entities: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period: Period,
    pub format: ExportFormat,
}

impl ExportRequest {
    pub fn from_json(body: &[u8]) -> Result<Self, ExportError> {
        serde_json::from_slice(body).map_err(|e| ExportError::Validation(e.to_string()))
    }

    pub fn validate(self) -> Result<ExportParams, ExportError> {
        let mut entities: Vec<String> = Vec::with_capacity(self.entities.len());
        for entity in self.entities {
            let entity = entity.trim();
            if entity.is_empty() {
                return Err(ExportError::Validation("entities: empty entity id".to_string()));
            }
            if !entities.iter().any(|e| e == entity) {
                entities.push(entity.to_string());
            }
        }
        if entities.is_empty() {
            return Err(ExportError::Validation(
                "entities: at least one entity is required".to_string(),
            ));
        }

        let start = parse_instant("start", &self.start)?;
        let end = parse_instant("end", &self.end)?;
        if end <= start {
            return Err(ExportError::Validation("end: must be after start".to_string()));
        }

        Ok(ExportParams {
            entities,
            start,
            end,
            period: self.period,
            format: self.format,
        })
    }
}

fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>, ExportError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ExportError::Validation(format!("{}: invalid datetime {:?} ({})", field, value, e)))
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}
