//! FILENAME: app/server/src/export.rs
// PURPOSE: The export pipeline: fetch, pivot, infer.
// CONTEXT: Runs once per request on validated parameters. Serialization of
// the result is driven by `stream`.

use crate::api_types::ExportParams;
use crate::error::ExportError;
use crate::log_info;
use chrono::{DateTime, Duration, Utc};
use engine::{record_count, ColumnSpec, Table};
use persistence::ExportFormat;
use pivot_engine::{infer_columns, pivot_series};
use recorder::RecorderApi;

/// Both ends of the requested range are moved back this many minutes before
/// querying, aligning the recorder's period boundaries with the range.
pub const RANGE_SKEW_MINUTES: i64 = 1;

/// File name stem offered to the client.
pub const FILE_STEM: &str = "statistics";

/// Everything a serializer needs for one export.
#[derive(Debug, Clone)]
pub struct PreparedExport {
    pub format: ExportFormat,
    pub table: Table,
    pub columns: Vec<ColumnSpec>,
}

impl PreparedExport {
    pub fn file_name(&self) -> String {
        self.format.file_name(FILE_STEM)
    }
}

pub fn skewed_range(start: DateTime<Utc>, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let skew = Duration::minutes(RANGE_SKEW_MINUTES);
    (start - skew, end - skew)
}

pub async fn prepare_export(
    recorder: &dyn RecorderApi,
    params: &ExportParams,
) -> Result<PreparedExport, ExportError> {
    let (start, end) = skewed_range(params.start, params.end);
    let series = recorder
        .statistics_during_period(&params.entities, start, end, params.period)
        .await?;

    let records = record_count(&series);
    let table = pivot_series(&series)?;
    let columns = infer_columns(&table);

    log_info!(
        "EXPORT",
        "prepared entities={} records={} rows={} columns={} format={}",
        params.entities.len(),
        records,
        table.len(),
        columns.len(),
        params.format.extension()
    );

    Ok(PreparedExport {
        format: params.format,
        table,
        columns,
    })
}
