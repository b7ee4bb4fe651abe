//! FILENAME: core/engine/src/table.rs
//! PURPOSE: The pivoted table: one row per distinct timestamp.
//! CONTEXT: A `Table` can only exist non-empty and strictly ascending by
//! timestamp, so serializers never have to re-check either property. It also
//! remembers every entity that contributed a record, in series order, which
//! is the column universe for schema inference.

use crate::column::ColumnSpec;
use crate::value::StatValue;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use thiserror::Error;

// ============================================================================
// ROW
// ============================================================================

/// One exported row: the join timestamp plus the entity values reported at it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    timestamp: DateTime<Utc>,
    values: IndexMap<String, StatValue>,
}

impl Row {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Row {
            timestamp,
            values: IndexMap::new(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Sets or overwrites the value of an entity. A new entity keeps its
    /// first-insertion position; an overwrite does not move it.
    pub fn set(&mut self, entity: &str, value: StatValue) {
        match self.values.get_mut(entity) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(entity.to_string(), value);
            }
        }
    }

    pub fn get(&self, entity: &str) -> Option<&StatValue> {
        self.values.get(entity)
    }

    /// Entity values in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn entity_count(&self) -> usize {
        self.values.len()
    }

    /// Looks up the cell this row holds for a column.
    pub fn cell(&self, column: &ColumnSpec) -> CellRef<'_> {
        if column.is_timestamp() {
            return CellRef::Timestamp(self.timestamp);
        }
        match self.values.get(&column.key) {
            Some(value) => CellRef::Value(value),
            None => CellRef::Absent,
        }
    }
}

/// A row's content at one column position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRef<'a> {
    Timestamp(DateTime<Utc>),
    Value(&'a StatValue),
    /// The entity reported nothing ending at this row's timestamp.
    Absent,
}

// ============================================================================
// TABLE
// ============================================================================

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("table has no rows")]
    Empty,

    #[error("row {index} is not strictly after its predecessor")]
    Unordered { index: usize },
}

/// Rows sorted strictly ascending by timestamp, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    entities: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Wraps rows that are already sorted with unique timestamps.
    /// `entities` lists the entity keys the rows may hold, in column order.
    pub fn from_sorted_rows(entities: Vec<String>, rows: Vec<Row>) -> Result<Self, TableError> {
        if rows.is_empty() {
            return Err(TableError::Empty);
        }
        if let Some(pos) = rows
            .windows(2)
            .position(|pair| pair[0].timestamp >= pair[1].timestamp)
        {
            return Err(TableError::Unordered { index: pos + 1 });
        }
        Ok(Table { entities, rows })
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Non-empty by construction.
    pub fn first_row(&self) -> &Row {
        &self.rows[0]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn overwrite_keeps_entity_position() {
        let mut row = Row::new(at(0));
        row.set("sensor.a", StatValue::Number(1.0));
        row.set("sensor.b", StatValue::Number(2.0));
        row.set("sensor.a", StatValue::Number(3.0));

        let entities: Vec<(&str, &StatValue)> = row.entities().collect();
        assert_eq!(
            entities,
            vec![
                ("sensor.a", &StatValue::Number(3.0)),
                ("sensor.b", &StatValue::Number(2.0)),
            ]
        );
    }

    #[test]
    fn cell_lookup_distinguishes_absent_from_null() {
        let mut row = Row::new(at(60000));
        row.set("sensor.a", StatValue::Null);

        assert_eq!(row.cell(&ColumnSpec::timestamp()), CellRef::Timestamp(at(60000)));
        assert_eq!(
            row.cell(&ColumnSpec::new("sensor.a", ColumnType::Text)),
            CellRef::Value(&StatValue::Null)
        );
        assert_eq!(
            row.cell(&ColumnSpec::new("sensor.b", ColumnType::Text)),
            CellRef::Absent
        );
    }

    #[test]
    fn table_rejects_empty_and_unordered_rows() {
        assert_eq!(Table::from_sorted_rows(vec![], vec![]), Err(TableError::Empty));
        assert_eq!(
            Table::from_sorted_rows(vec![], vec![Row::new(at(2)), Row::new(at(1))]),
            Err(TableError::Unordered { index: 1 })
        );
        assert_eq!(
            Table::from_sorted_rows(vec![], vec![Row::new(at(1)), Row::new(at(1))]),
            Err(TableError::Unordered { index: 1 })
        );

        let table =
            Table::from_sorted_rows(vec![], vec![Row::new(at(1)), Row::new(at(2))]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.first_row().timestamp(), at(1));
    }
}
