//! FILENAME: core/engine/src/value.rs
//! PURPOSE: Defines the value a statistic can hold for one interval.
//! CONTEXT: The recorder reports `state` as a JSON scalar. This enum is the
//! closed set of kinds the rest of the pipeline reasons about.

use serde::{Deserialize, Serialize};

/// A single reported statistic value.
///
/// `Null` is a record the recorder sent with a `null` state. It is distinct
/// from a cell that has no record at all (see `CellRef::Absent`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl StatValue {
    pub fn is_null(&self) -> bool {
        matches!(self, StatValue::Null)
    }

    /// Returns the value as plain text, the way it appears in a text cell.
    pub fn display_text(&self) -> String {
        match self {
            StatValue::Null => String::new(),
            StatValue::Boolean(b) => b.to_string(),
            StatValue::Number(n) => format_number(*n),
            StatValue::Text(s) => s.clone(),
        }
    }
}

/// Formats a number without unnecessary decimal places.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

impl From<f64> for StatValue {
    fn from(n: f64) -> Self {
        StatValue::Number(n)
    }
}

impl From<bool> for StatValue {
    fn from(b: bool) -> Self {
        StatValue::Boolean(b)
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        StatValue::Text(s)
    }
}
