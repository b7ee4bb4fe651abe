//! FILENAME: core/engine/src/timestamp.rs
//! PURPOSE: Converts instants to and from the encodings the exporter deals in.
//! CONTEXT: The recorder interprets range boundaries in the calendar of the
//! offset they carry, so outgoing instants embed the local UTC offset
//! instead of `Z`. Incoming instants are epoch milliseconds.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer};
use std::fmt::Display;

/// `YYYY-MM-DDTHH:mm:ss±HH:MM`
pub const RECORDER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Encodes an instant using the calendar fields and UTC offset of `tz`.
pub fn encode<Tz>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format(RECORDER_FORMAT).to_string()
}

/// Encodes an instant in the process local timezone.
pub fn encode_local(instant: &DateTime<Utc>) -> String {
    encode(instant, &Local)
}

/// Reconstructs an instant from epoch milliseconds.
/// Returns `None` for non-finite or out-of-range input.
pub fn decode(epoch_millis: f64) -> Option<DateTime<Utc>> {
    if !epoch_millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(epoch_millis.floor() as i64)
}

/// UTC rendering with millisecond precision, e.g. `1970-01-01T00:01:00.000Z`.
pub fn to_json_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for numeric epoch-millisecond fields (integer or float).
pub fn deserialize_epoch_millis<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = f64::deserialize(deserializer)?;
    decode(millis).ok_or_else(|| {
        de::Error::custom(format!("epoch milliseconds out of range: {}", millis))
    })
}
