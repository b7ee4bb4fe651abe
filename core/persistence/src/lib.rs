//! FILENAME: core/persistence/src/lib.rs
//! Statistics Export Serializers
//!
//! Writes a pivoted table in one of two encodings: an XLSX workbook or
//! semicolon-delimited text. Both share the `TableSerializer` contract and
//! write columns exactly in column-spec order.

mod csv_writer;
mod error;
mod xlsx_writer;

pub use csv_writer::{json_literal, CsvSerializer, ABSENT_LITERAL};
pub use error::PersistenceError;
pub use xlsx_writer::{XlsxSerializer, DATE_FORMAT, SHEET_NAME};

use engine::{ColumnSpec, Table};
use serde::{Deserialize, Serialize};
use std::io::Write;

// ============================================================================
// SERIALIZER CONTRACT
// ============================================================================

/// Produces the bytes of one export from a table and its column schema.
///
/// Implementations write incrementally to `out` and return an error instead
/// of leaving a silently truncated document behind.
pub trait TableSerializer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn serialize(
        &self,
        table: &Table,
        columns: &[ColumnSpec],
        out: &mut dyn Write,
    ) -> Result<(), PersistenceError>;
}

// ============================================================================
// EXPORT FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "xlsx", alias = "spreadsheet")]
    Xlsx,
    #[serde(rename = "csv", alias = "delimited")]
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/plain; charset=utf-8",
        }
    }

    /// File name offered to the client, e.g. `statistics.xlsx`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }

    /// The serializer for this format with its default settings.
    pub fn serializer(&self) -> Box<dyn TableSerializer> {
        match self {
            ExportFormat::Xlsx => Box::new(XlsxSerializer::default()),
            ExportFormat::Csv => Box::new(CsvSerializer),
        }
    }
}
