//! FILENAME: core/engine/src/record.rs
//! PURPOSE: One aggregated reading per entity per period, as the recorder
//! returns it, and the per-entity series map that groups them.

use crate::timestamp::deserialize_epoch_millis;
use crate::value::StatValue;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

/// Entity id to its interval records, in the order the recorder sent them.
pub type SeriesMap = IndexMap<String, Vec<IntervalRecord>>;

/// One aggregated reading for one entity over one period.
/// Statistic fields other than `state` (mean, min, max, sum...) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IntervalRecord {
    #[serde(deserialize_with = "deserialize_epoch_millis")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_epoch_millis")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub state: StatValue,
}

impl IntervalRecord {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, state: impl Into<StatValue>) -> Self {
        IntervalRecord {
            start,
            end,
            state: state.into(),
        }
    }
}

/// Total number of interval records across every entity.
pub fn record_count(series: &SeriesMap) -> usize {
    series.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_decodes_a_recorder_result() {
        let json = r#"{
            "sensor.b": [{"start": 0, "end": 60000.0, "state": true, "mean": 1.0}],
            "sensor.a": [
                {"start": 0, "end": 60000, "state": 21.5},
                {"start": 60000, "end": 120000, "state": null}
            ]
        }"#;
        let series: SeriesMap = serde_json::from_str(json).unwrap();

        let keys: Vec<&str> = series.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["sensor.b", "sensor.a"]);
        assert_eq!(series["sensor.a"][1].end.timestamp_millis(), 120000);
        assert_eq!(series["sensor.a"][1].state, StatValue::Null);
        assert_eq!(series["sensor.b"][0].state, StatValue::Boolean(true));
        assert_eq!(record_count(&series), 3);
    }

    #[test]
    fn missing_state_decodes_as_null() {
        let record: IntervalRecord =
            serde_json::from_str(r#"{"start": 0, "end": 300000, "sum": 4.2}"#).unwrap();
        assert!(record.state.is_null());
    }

    #[test]
    fn it_rejects_non_numeric_bounds() {
        let result: Result<IntervalRecord, _> =
            serde_json::from_str(r#"{"start": "yesterday", "end": 0, "state": 1}"#);
        assert!(result.is_err());
    }
}
