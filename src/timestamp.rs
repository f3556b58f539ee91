//! Fixed-format timestamp handling
//!
//! Every timestamp in an export is a naive wall-clock time written as
//! `YYYY-MM-DD HH:MM:SS` (no timezone, no fractional seconds). All parsing
//! goes through [`parse_timestamp`]; any other textual form is rejected.

use crate::error::ComputeError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The only accepted textual timestamp format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a timestamp in [`TIMESTAMP_FORMAT`].
///
/// The parsed instant must render back to exactly `text`, which rejects the
/// looser forms chrono's parser lets through.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, ComputeError> {
    let mismatch = |reason: &dyn std::fmt::Display| {
        ComputeError::DateParseError(format!(
            "{:?} does not match {}: {}",
            text, TIMESTAMP_FORMAT, reason
        ))
    };

    let instant = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|e| mismatch(&e))?;
    if format_timestamp(&instant) != text {
        return Err(mismatch(&"not in canonical form"));
    }
    Ok(instant)
}

/// Render an instant in [`TIMESTAMP_FORMAT`]
pub fn format_timestamp(instant: &NaiveDateTime) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Signed elapsed seconds from `earlier` to `later`
pub fn seconds_between(later: NaiveDateTime, earlier: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}

/// A timestamp as it appears in an export record.
///
/// JSON exports carry text; library callers that already hold a parsed
/// instant can pass it through without a round trip. Anything else the
/// export holds in a timestamp slot (null, numbers, a missing key) is kept
/// as `Malformed` so the transformer can report it with its field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTimestamp {
    Text(String),
    Instant(NaiveDateTime),
    Malformed(Value),
}

impl RawTimestamp {
    /// Resolve to a comparable instant
    pub fn resolve(&self) -> Result<NaiveDateTime, ComputeError> {
        match self {
            RawTimestamp::Text(text) => parse_timestamp(text),
            RawTimestamp::Instant(instant) => Ok(*instant),
            RawTimestamp::Malformed(value) => Err(ComputeError::DateParseError(format!(
                "expected a timestamp string, got {}",
                value
            ))),
        }
    }

    /// Placeholder for a record whose `timestamp` key is missing
    pub fn missing() -> Self {
        RawTimestamp::Malformed(Value::Null)
    }

    /// Textual form, used when reporting a bad value
    pub fn to_text(&self) -> String {
        match self {
            RawTimestamp::Text(text) => text.clone(),
            RawTimestamp::Instant(instant) => format_timestamp(instant),
            RawTimestamp::Malformed(value) => value.to_string(),
        }
    }
}

impl From<&str> for RawTimestamp {
    fn from(text: &str) -> Self {
        RawTimestamp::Text(text.to_string())
    }
}

impl From<NaiveDateTime> for RawTimestamp {
    fn from(instant: NaiveDateTime) -> Self {
        RawTimestamp::Instant(instant)
    }
}

impl Serialize for RawTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawTimestamp::Text(text) => serializer.serialize_str(text),
            RawTimestamp::Instant(instant) => serializer.serialize_str(&format_timestamp(instant)),
            RawTimestamp::Malformed(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RawTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => RawTimestamp::Text(text),
            other => RawTimestamp::Malformed(other),
        })
    }
}

/// Serde adapter for `Option<NaiveDateTime>` fields written in [`TIMESTAMP_FORMAT`]
pub mod optional_fixed {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(instant) => serializer.serialize_str(&format_timestamp(instant)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        text.map(|t| parse_timestamp(&t).map_err(serde::de::Error::custom))
            .transpose()
    }
}
