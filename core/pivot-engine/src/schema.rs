//! FILENAME: core/pivot-engine/src/schema.rs
//! Column schema inference.
//!
//! Column types are read off the FIRST row only. An entity absent from that
//! row is typed Text, and a column keeps the kind its first value had even
//! when later rows report something else (a sensor that is sometimes
//! "unavailable", for instance). Exported files depend on this layout, so it
//! is kept as-is.

use engine::{ColumnSpec, ColumnType, StatValue, Table};

/// Derives the column specs for a table: `timestamp` first, then one column
/// per table entity in series order.
pub fn infer_columns(table: &Table) -> Vec<ColumnSpec> {
    let first = table.first_row();

    let mut columns = Vec::with_capacity(table.entities().len() + 1);
    columns.push(ColumnSpec::timestamp());
    for entity in table.entities() {
        columns.push(ColumnSpec::new(entity.as_str(), column_type_of(first.get(entity))));
    }
    columns
}

fn column_type_of(value: Option<&StatValue>) -> ColumnType {
    match value {
        Some(StatValue::Boolean(_)) => ColumnType::Boolean,
        Some(StatValue::Number(_)) => ColumnType::Number,
        Some(StatValue::Text(_)) | Some(StatValue::Null) | None => ColumnType::Text,
    }
}
