//! FILENAME: core/persistence/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("table of {rows} rows x {columns} columns exceeds the worksheet limits")]
    SheetLimit { rows: usize, columns: usize },
}
