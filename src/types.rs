//! Core output types
//!
//! An [`InteractionRow`] is the flat, one-row-per-interaction view of an
//! export. Column names are fixed and consumed by downstream charting code,
//! so they must not change.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Output columns, in table order
pub const COLUMN_NAMES: [&str; 14] = [
    "match_type",
    "match_timestamp",
    "like_type",
    "like_timestamp",
    "block_type",
    "blocked_timestamp",
    "met",
    "num_messages",
    "time_between_first_and_last_message",
    "avg_time_between_messages",
    "avg_message_length",
    "time_between_match_and_first_message",
    "time_between_like_and_match",
    "num_voice_notes",
];

/// Whether the interaction turned into a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Match,
    NoMatch,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Match => "match",
            MatchType::NoMatch => "no_match",
        }
    }
}

/// Direction of the like.
///
/// The export only records likes the owner sent. An interaction without a
/// `like` group is therefore classified as [`LikeType::Received`]. This is a
/// rule of the export format, not a general default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeType {
    Sent,
    Received,
}

impl LikeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeType::Sent => "sent",
            LikeType::Received => "received",
        }
    }
}

/// One normalized interaction.
///
/// Time-based fields are elapsed seconds; `None` means "not computable" and
/// is distinct from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRow {
    pub match_type: MatchType,
    #[serde(with = "crate::timestamp::optional_fixed")]
    pub match_timestamp: Option<NaiveDateTime>,
    pub like_type: LikeType,
    #[serde(with = "crate::timestamp::optional_fixed")]
    pub like_timestamp: Option<NaiveDateTime>,
    pub block_type: Option<String>,
    #[serde(with = "crate::timestamp::optional_fixed")]
    pub blocked_timestamp: Option<NaiveDateTime>,
    /// "We met" answer, passed through as written
    pub met: Option<Value>,
    pub num_messages: usize,
    pub time_between_first_and_last_message: Option<f64>,
    pub avg_time_between_messages: Option<f64>,
    /// Mean words per message; 0 when there are no messages
    pub avg_message_length: f64,
    /// Match time minus first message time
    pub time_between_match_and_first_message: Option<f64>,
    /// Match time minus like time
    pub time_between_like_and_match: Option<f64>,
    pub num_voice_notes: usize,
}

impl InteractionRow {
    /// Cell value for a named column, `None` for an unknown column.
    ///
    /// Absent cells come back as `Value::Null`.
    pub fn value(&self, column: &str) -> Option<Value> {
        let ts = |t: &Option<NaiveDateTime>| {
            t.as_ref()
                .map_or(Value::Null, |t| json!(crate::timestamp::format_timestamp(t)))
        };

        let value = match column {
            "match_type" => json!(self.match_type.as_str()),
            "match_timestamp" => ts(&self.match_timestamp),
            "like_type" => json!(self.like_type.as_str()),
            "like_timestamp" => ts(&self.like_timestamp),
            "block_type" => json!(self.block_type),
            "blocked_timestamp" => ts(&self.blocked_timestamp),
            "met" => self.met.clone().unwrap_or(Value::Null),
            "num_messages" => json!(self.num_messages),
            "time_between_first_and_last_message" => json!(self.time_between_first_and_last_message),
            "avg_time_between_messages" => json!(self.avg_time_between_messages),
            "avg_message_length" => json!(self.avg_message_length),
            "time_between_match_and_first_message" => {
                json!(self.time_between_match_and_first_message)
            }
            "time_between_like_and_match" => json!(self.time_between_like_and_match),
            "num_voice_notes" => json!(self.num_voice_notes),
            _ => return None,
        };

        Some(value)
    }
}
