//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Data model shared by the statistics export pipeline.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod column;
pub mod period;
pub mod record;
pub mod table;
pub mod timestamp;
pub mod value;

// Re-export commonly used types at the crate root
pub use column::{ColumnSpec, ColumnType, DEFAULT_COLUMN_WIDTH, TIMESTAMP_KEY};
pub use period::{Period, StatisticKind};
pub use record::{record_count, IntervalRecord, SeriesMap};
pub use table::{CellRef, Row, Table, TableError};
pub use value::{format_number, StatValue};
