//! FILENAME: core/persistence/src/csv_writer.rs
//! PURPOSE: Semicolon-delimited text export.
//! FORMAT: every field is a JSON literal. Header fields are the quoted column
//! keys; data fields are the JSON encoding of the cell. An absent cell is the
//! bare word `undefined`. Fields are joined by `;`, lines by `\n`, and the
//! last line has no terminator.

use crate::{ExportFormat, PersistenceError, TableSerializer};
use engine::{timestamp, CellRef, ColumnSpec, StatValue, Table};
use std::io::{BufWriter, Write};

/// Placeholder written for a column the row has no value for.
pub const ABSENT_LITERAL: &str = "undefined";

const DELIMITER: &[u8] = b";";
const LINE_END: &[u8] = b"\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSerializer;

impl TableSerializer for CsvSerializer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn serialize(
        &self,
        table: &Table,
        columns: &[ColumnSpec],
        out: &mut dyn Write,
    ) -> Result<(), PersistenceError> {
        let mut out = BufWriter::new(out);

        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                out.write_all(DELIMITER)?;
            }
            out.write_all(serde_json::to_string(&column.key)?.as_bytes())?;
        }

        for row in table {
            out.write_all(LINE_END)?;
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    out.write_all(DELIMITER)?;
                }
                out.write_all(field(row.cell(column))?.as_bytes())?;
            }
        }

        out.flush()?;
        log::debug!(target: "EXPORT", "csv rows={} columns={}", table.len(), columns.len());
        Ok(())
    }
}

fn field(cell: CellRef<'_>) -> Result<String, PersistenceError> {
    Ok(match cell {
        CellRef::Timestamp(ts) => serde_json::to_string(&timestamp::to_json_instant(&ts))?,
        CellRef::Value(value) => json_literal(value)?,
        CellRef::Absent => ABSENT_LITERAL.to_string(),
    })
}

/// JSON encoding of a value. Integral numbers carry no fraction and
/// non-finite numbers become `null`.
pub fn json_literal(value: &StatValue) -> Result<String, PersistenceError> {
    Ok(match value {
        StatValue::Null => "null".to_string(),
        StatValue::Boolean(b) => b.to_string(),
        StatValue::Number(n) if !n.is_finite() => "null".to_string(),
        StatValue::Number(n) if *n == 0.0 => "0".to_string(),
        StatValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e21 => format!("{:.0}", n),
        StatValue::Number(n) => serde_json::to_string(n)?,
        StatValue::Text(s) => serde_json::to_string(s)?,
    })
}
