//! FILENAME: core/persistence/src/xlsx_writer.rs
//! PURPOSE: XLSX workbook export.
//! CONTEXT: One worksheet, bold header row frozen above the data, one column
//! per column spec. The column type decides how each cell is encoded.
//! The worksheet runs in constant-memory mode: each finished row is flushed
//! to disk, so cells must be written strictly row by row, left to right.
//! The package is zipped into a temporary file and copied out from there.

use crate::{ExportFormat, PersistenceError, TableSerializer};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use engine::{CellRef, ColumnSpec, ColumnType, StatValue, Table};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};
use std::io::{self, Seek, SeekFrom, Write};

pub const SHEET_NAME: &str = "Home Assistant Statistics";

/// Display format of the timestamp column.
pub const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm";

// Excel worksheet limits, header row included.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

#[derive(Debug, Clone)]
pub struct XlsxSerializer {
    pub sheet_name: String,
    /// Offset used to turn instants into wall-clock cells. `None` uses the
    /// process local timezone.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for XlsxSerializer {
    fn default() -> Self {
        Self {
            sheet_name: SHEET_NAME.to_string(),
            utc_offset: None,
        }
    }
}

impl XlsxSerializer {
    pub fn with_offset(utc_offset: FixedOffset) -> Self {
        Self {
            utc_offset: Some(utc_offset),
            ..Self::default()
        }
    }

    fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self.utc_offset {
            Some(offset) => instant.with_timezone(&offset).naive_local(),
            None => instant.with_timezone(&Local).naive_local(),
        }
    }

    fn build_workbook(
        &self,
        table: &Table,
        columns: &[ColumnSpec],
    ) -> Result<Workbook, PersistenceError> {
        if table.len() + 1 > MAX_ROWS || columns.len() > MAX_COLUMNS {
            return Err(PersistenceError::SheetLimit {
                rows: table.len(),
                columns: columns.len(),
            });
        }

        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format(DATE_FORMAT);

        let mut xlsx = Workbook::new();
        let worksheet = xlsx.add_worksheet_with_constant_memory();
        worksheet.set_name(&self.sheet_name)?;
        worksheet.set_freeze_panes(1, 0)?;

        for (col, column) in columns.iter().enumerate() {
            worksheet.set_column_width(col as ColNum, column.width)?;
        }
        for (col, column) in columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as ColNum, &column.key, &header_format)?;
        }

        for (idx, row) in table.iter().enumerate() {
            let sheet_row = (idx + 1) as RowNum;
            for (col, column) in columns.iter().enumerate() {
                self.write_cell(
                    worksheet,
                    sheet_row,
                    col as ColNum,
                    column.column_type,
                    row.cell(column),
                    &date_format,
                )?;
            }
        }

        Ok(xlsx)
    }

    fn write_cell(
        &self,
        worksheet: &mut Worksheet,
        row: RowNum,
        col: ColNum,
        column_type: ColumnType,
        cell: CellRef<'_>,
        date_format: &Format,
    ) -> Result<(), XlsxError> {
        match cell {
            CellRef::Timestamp(ts) => {
                let local = self.wall_clock(ts);
                worksheet.write_datetime_with_format(row, col, &local, date_format)?;
            }
            CellRef::Absent | CellRef::Value(StatValue::Null) => {}
            CellRef::Value(value) => match (column_type, value) {
                (ColumnType::Number, StatValue::Number(n)) if n.is_finite() => {
                    worksheet.write_number(row, col, *n)?;
                }
                (ColumnType::Boolean, StatValue::Boolean(b)) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                // Text columns and values that disagree with their column type
                (_, other) => {
                    worksheet.write_string(row, col, other.display_text())?;
                }
            },
        }
        Ok(())
    }
}

impl TableSerializer for XlsxSerializer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn serialize(
        &self,
        table: &Table,
        columns: &[ColumnSpec],
        out: &mut dyn Write,
    ) -> Result<(), PersistenceError> {
        let mut xlsx = self.build_workbook(table, columns)?;
        let mut package = tempfile::tempfile()?;
        xlsx.save_to_writer(&mut package)?;
        drop(xlsx);

        package.seek(SeekFrom::Start(0))?;
        let bytes = io::copy(&mut package, out)?;
        out.flush()?;

        log::debug!(
            target: "EXPORT",
            "xlsx rows={} columns={} bytes={}",
            table.len(),
            columns.len(),
            bytes
        );
        Ok(())
    }
}
