//! FILENAME: core/engine/src/column.rs
//! PURPOSE: Column schema of an exported table.
//! CONTEXT: The type of each column is decided once and carried through
//! serialization as data.

use serde::{Deserialize, Serialize};

/// Key of the join column present in every row.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Display width for every column, in character units.
pub const DEFAULT_COLUMN_WIDTH: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Date,
    Boolean,
    Number,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub column_type: ColumnType,
    pub width: f64,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, column_type: ColumnType) -> Self {
        ColumnSpec {
            key: key.into(),
            column_type,
            width: DEFAULT_COLUMN_WIDTH,
        }
    }

    pub fn timestamp() -> Self {
        Self::new(TIMESTAMP_KEY, ColumnType::Date)
    }

    pub fn is_timestamp(&self) -> bool {
        self.key == TIMESTAMP_KEY
    }
}
