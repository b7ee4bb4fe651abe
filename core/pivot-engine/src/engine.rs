//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - joins per-entity series into one timestamp-keyed table.
//!
//! Algorithm:
//! 1. Rows live in one append-ordered Vec; an FxHashMap maps each join
//!    timestamp to its row index, so each record is placed in O(1).
//! 2. Entities are visited in series order, records in the order the
//!    recorder sent them. A record joins on its interval END.
//! 3. Unknown timestamp: append a row. Known timestamp: set or overwrite
//!    the entity's value in that row.
//! 4. Rows are sorted ascending by timestamp once accumulation is done.
//!
//! An entity with no record ending at a row's timestamp stays absent from
//! that row. Nothing is interpolated. Entities that returned no records at
//! all are left out of the table's entity list.

use chrono::{DateTime, Utc};
use engine::{record_count, Row, SeriesMap, Table, TableError};
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PivotError {
    #[error("no statistics were returned for the requested entities and range")]
    NoData,

    #[error("pivoted rows violate table ordering: {0}")]
    Table(#[from] TableError),
}

// ============================================================================
// ROW ACCUMULATOR
// ============================================================================

/// Arena of rows plus the timestamp index into it.
#[derive(Debug, Default)]
struct RowAccumulator {
    rows: Vec<Row>,
    index: FxHashMap<DateTime<Utc>, usize>,
}

impl RowAccumulator {
    fn with_capacity(capacity: usize) -> Self {
        RowAccumulator {
            rows: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Returns the row for `timestamp`, creating it on first sight.
    fn row_at(&mut self, timestamp: DateTime<Utc>) -> &mut Row {
        let rows = &mut self.rows;
        let idx = *self.index.entry(timestamp).or_insert_with(|| {
            rows.push(Row::new(timestamp));
            rows.len() - 1
        });
        &mut self.rows[idx]
    }

    fn into_sorted_rows(self) -> Vec<Row> {
        let mut rows = self.rows;
        rows.sort_unstable_by_key(Row::timestamp);
        rows
    }
}

// ============================================================================
// PIVOT
// ============================================================================

/// Pivots a series map into a table with one row per distinct interval end.
///
/// Returns `PivotError::NoData` when the map holds no records at all.
pub fn pivot_series(series: &SeriesMap) -> Result<Table, PivotError> {
    let total = record_count(series);
    if total == 0 {
        log::info!(target: "PIVOT", "no records for {} entities", series.len());
        return Err(PivotError::NoData);
    }

    // Entities usually share interval ends, so one entity's length is a
    // good upper bound for the row count.
    let expected_rows = series.values().map(Vec::len).max().unwrap_or(0);
    let mut acc = RowAccumulator::with_capacity(expected_rows);

    for (entity, records) in series {
        for record in records {
            acc.row_at(record.end).set(entity, record.state.clone());
        }
    }

    let entities: Vec<String> = series
        .iter()
        .filter(|(_, records)| !records.is_empty())
        .map(|(entity, _)| entity.clone())
        .collect();
    let rows = acc.into_sorted_rows();
    log::debug!(
        target: "PIVOT",
        "pivoted records={} entities={} rows={}",
        total,
        series.len(),
        rows.len()
    );

    Ok(Table::from_sorted_rows(entities, rows)?)
}
