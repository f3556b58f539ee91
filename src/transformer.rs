//! Interaction transformation
//!
//! Turns raw interaction records into flat [`InteractionRow`]s:
//! - match / like / block / "we met" classification
//! - chat statistics (count, span, mean gap, mean words per message)
//! - match-to-first-message and like-to-match gaps
//! - voice note count
//!
//! Every record is handled with its own local state only; nothing carries
//! over from one record to the next.

use crate::error::ComputeError;
use crate::schema::{ChatMessage, RawInteraction};
use crate::timestamp::{seconds_between, RawTimestamp};
use crate::types::{InteractionRow, LikeType, MatchType};
use chrono::NaiveDateTime;

/// Transformer from raw interactions to output rows
pub struct InteractionTransformer;

impl InteractionTransformer {
    /// Transform every interaction, preserving input order.
    ///
    /// Fails on the first interaction carrying a malformed timestamp.
    pub fn transform(interactions: &[RawInteraction]) -> Result<Vec<InteractionRow>, ComputeError> {
        let rows = interactions
            .iter()
            .enumerate()
            .map(|(index, interaction)| Self::transform_one(index, interaction))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(interactions = rows.len(), "transformed export");
        Ok(rows)
    }

    /// Transform a single interaction. `index` is only used in error reports.
    pub fn transform_one(
        index: usize,
        interaction: &RawInteraction,
    ) -> Result<InteractionRow, ComputeError> {
        let (match_type, match_timestamp) = match interaction.first_match() {
            Some(m) => (
                MatchType::Match,
                Some(resolve(index, "match[0].timestamp", &m.timestamp)?),
            ),
            None => (MatchType::NoMatch, None),
        };

        // A missing like group means the like was received
        let (like_type, like_timestamp) = match interaction.first_like() {
            Some(like) => (
                LikeType::Sent,
                Some(resolve(index, "like[0].timestamp", &like.timestamp)?),
            ),
            None => (LikeType::Received, None),
        };

        let (block_type, blocked_timestamp) = match interaction.first_block() {
            Some(block) => (
                Some(block.block_type.clone()),
                Some(resolve(index, "block[0].timestamp", &block.timestamp)?),
            ),
            None => (None, None),
        };

        let met = interaction
            .first_we_met()
            .and_then(|we_met| we_met.did_meet_subject.clone());

        let chats = ChatMetrics::from_messages(index, interaction.chat_messages())?;

        let time_between_match_and_first_message = match (match_timestamp, chats.first_message_at) {
            (Some(matched), Some(first)) => Some(seconds_between(matched, first)),
            _ => None,
        };

        let time_between_like_and_match = match (like_timestamp, match_timestamp) {
            (Some(liked), Some(matched)) => Some(seconds_between(matched, liked)),
            _ => None,
        };

        Ok(InteractionRow {
            match_type,
            match_timestamp,
            like_type,
            like_timestamp,
            block_type,
            blocked_timestamp,
            met,
            num_messages: chats.num_messages,
            time_between_first_and_last_message: chats.time_between_first_and_last_message,
            avg_time_between_messages: chats.avg_time_between_messages,
            avg_message_length: chats.avg_message_length,
            time_between_match_and_first_message,
            time_between_like_and_match,
            num_voice_notes: interaction.voice_note_count(),
        })
    }
}

/// Statistics over one interaction's chat messages
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMetrics {
    pub num_messages: usize,
    /// Earliest message instant
    pub first_message_at: Option<NaiveDateTime>,
    /// Last minus first message, in seconds (needs two messages)
    pub time_between_first_and_last_message: Option<f64>,
    /// Mean gap between consecutive messages, in seconds (needs two messages)
    pub avg_time_between_messages: Option<f64>,
    /// Mean whitespace-separated words per message, 0 without messages
    pub avg_message_length: f64,
}

impl ChatMetrics {
    /// Compute chat statistics. An empty slice yields the "no chats" values.
    pub fn from_messages(index: usize, messages: &[ChatMessage]) -> Result<Self, ComputeError> {
        let mut instants = messages
            .iter()
            .enumerate()
            .map(|(i, msg)| resolve(index, &format!("chats[{}].timestamp", i), &msg.timestamp))
            .collect::<Result<Vec<_>, _>>()?;

        // Stable, so equal instants keep their export order
        instants.sort();

        let gaps: Vec<f64> = instants
            .windows(2)
            .map(|pair| seconds_between(pair[1], pair[0]))
            .collect();

        let time_between_first_and_last_message = match (instants.first(), instants.last()) {
            (Some(first), Some(last)) if instants.len() > 1 => Some(seconds_between(*last, *first)),
            _ => None,
        };

        let avg_time_between_messages = if gaps.is_empty() {
            None
        } else {
            Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
        };

        let avg_message_length = if messages.is_empty() {
            0.0
        } else {
            let words: usize = messages.iter().map(word_count).sum();
            words as f64 / messages.len() as f64
        };

        Ok(ChatMetrics {
            num_messages: messages.len(),
            first_message_at: instants.first().copied(),
            time_between_first_and_last_message,
            avg_time_between_messages,
            avg_message_length,
        })
    }
}

fn word_count(message: &ChatMessage) -> usize {
    message
        .body
        .as_deref()
        .map_or(0, |body| body.split_whitespace().count())
}

/// Resolve a record timestamp, attaching the record index and field path on failure
fn resolve(index: usize, field: &str, timestamp: &RawTimestamp) -> Result<NaiveDateTime, ComputeError> {
    timestamp.resolve().map_err(|e| {
        tracing::warn!(index, field, error = %e, "rejecting malformed timestamp");
        ComputeError::TimestampFormat {
            index,
            field: field.to_string(),
            value: timestamp.to_text(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BlockEvent, ExportAdapter, LikeEvent, MatchEvent, WeMetEvent};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn chat(timestamp: &str, body: Option<&str>) -> ChatMessage {
        ChatMessage {
            timestamp: RawTimestamp::from(timestamp),
            body: body.map(str::to_string),
        }
    }

    fn transform_json(json: &str) -> Result<Vec<InteractionRow>, ComputeError> {
        let interactions = ExportAdapter::parse_array(json)?;
        InteractionTransformer::transform(&interactions)
    }

    #[test]
    fn test_bare_interaction_defaults() {
        let row = InteractionTransformer::transform_one(0, &RawInteraction::default()).unwrap();

        assert_eq!(
            row,
            InteractionRow {
                match_type: MatchType::NoMatch,
                match_timestamp: None,
                like_type: LikeType::Received,
                like_timestamp: None,
                block_type: None,
                blocked_timestamp: None,
                met: None,
                num_messages: 0,
                time_between_first_and_last_message: None,
                avg_time_between_messages: None,
                avg_message_length: 0.0,
                time_between_match_and_first_message: None,
                time_between_like_and_match: None,
                num_voice_notes: 0,
            }
        );
    }

    #[test]
    fn test_two_message_chat() {
        let rows = transform_json(
            r#"[{ "chats": [
                { "timestamp": "2023-01-01 10:00:00", "body": "hi" },
                { "timestamp": "2023-01-01 12:00:00", "body": "how are you" }
            ]}]"#,
        )
        .unwrap();

        let row = &rows[0];
        assert_eq!(row.num_messages, 2);
        assert_eq!(row.time_between_first_and_last_message, Some(7200.0));
        assert_eq!(row.avg_time_between_messages, Some(7200.0));
        assert_eq!(row.avg_message_length, 1.5);
    }

    #[test]
    fn test_single_message_chat() {
        let metrics =
            ChatMetrics::from_messages(0, &[chat("2023-01-01 10:00:00", Some("hey there you"))])
                .unwrap();

        assert_eq!(metrics.num_messages, 1);
        assert_eq!(metrics.time_between_first_and_last_message, None);
        assert_eq!(metrics.avg_time_between_messages, None);
        assert_eq!(metrics.avg_message_length, 3.0);
        assert_eq!(metrics.first_message_at, Some(at(1, 10, 0, 0)));
    }

    #[test]
    fn test_unsorted_chats_are_ordered_before_gaps() {
        let metrics = ChatMetrics::from_messages(
            0,
            &[
                chat("2023-01-01 11:00:00", None),
                chat("2023-01-01 10:00:00", Some("first")),
                chat("2023-01-01 10:30:00", Some("  spaced   out\twords ")),
            ],
        )
        .unwrap();

        assert_eq!(metrics.first_message_at, Some(at(1, 10, 0, 0)));
        assert_eq!(metrics.time_between_first_and_last_message, Some(3600.0));
        // gaps 1800, 1800
        assert_eq!(metrics.avg_time_between_messages, Some(1800.0));
        // 0 + 1 + 3 words over 3 messages
        assert!((metrics.avg_message_length - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_timestamps_give_zero_gap() {
        let metrics = ChatMetrics::from_messages(
            0,
            &[
                chat("2023-01-01 10:00:00", Some("a")),
                chat("2023-01-01 10:00:00", Some("b")),
            ],
        )
        .unwrap();

        assert_eq!(metrics.time_between_first_and_last_message, Some(0.0));
        assert_eq!(metrics.avg_time_between_messages, Some(0.0));
    }

    #[test]
    fn test_empty_chats_match_absent_chats() {
        let empty = RawInteraction {
            chats: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(
            InteractionTransformer::transform_one(0, &empty).unwrap(),
            InteractionTransformer::transform_one(0, &RawInteraction::default()).unwrap()
        );
    }

    #[test]
    fn test_like_to_match_gap() {
        let rows = transform_json(
            r#"[{
                "like": [{ "timestamp": "2023-01-01 09:00:00" }],
                "match": [{ "timestamp": "2023-01-01 09:30:00" }]
            }]"#,
        )
        .unwrap();

        let row = &rows[0];
        assert_eq!(row.like_type, LikeType::Sent);
        assert_eq!(row.match_type, MatchType::Match);
        assert_eq!(row.like_timestamp, Some(at(1, 9, 0, 0)));
        assert_eq!(row.match_timestamp, Some(at(1, 9, 30, 0)));
        assert_eq!(row.time_between_like_and_match, Some(1800.0));
    }

    #[test]
    fn test_match_to_first_message_gap_is_match_minus_first() {
        let interaction = RawInteraction {
            match_events: Some(vec![MatchEvent {
                timestamp: RawTimestamp::from("2023-01-01 09:30:00"),
            }]),
            chats: Some(vec![
                chat("2023-01-01 12:00:00", Some("later")),
                chat("2023-01-01 10:00:00", Some("first")),
            ]),
            ..Default::default()
        };

        let row = InteractionTransformer::transform_one(0, &interaction).unwrap();
        assert_eq!(row.time_between_match_and_first_message, Some(-1800.0));
    }

    #[test]
    fn test_match_without_chats_has_no_first_message_gap() {
        // The first record has chats; the second must not reuse them
        let rows = transform_json(
            r#"[
                { "chats": [{ "timestamp": "2023-01-01 10:00:00", "body": "hi" }] },
                { "match": [{ "timestamp": "2023-01-02 09:00:00" }] }
            ]"#,
        )
        .unwrap();

        assert_eq!(rows[1].match_type, MatchType::Match);
        assert_eq!(rows[1].num_messages, 0);
        assert_eq!(rows[1].time_between_match_and_first_message, None);
    }

    #[test]
    fn test_like_without_match_has_no_gap() {
        let interaction = RawInteraction {
            likes: Some(vec![LikeEvent {
                timestamp: RawTimestamp::from("2023-01-01 09:00:00"),
                comment: None,
            }]),
            ..Default::default()
        };

        let row = InteractionTransformer::transform_one(0, &interaction).unwrap();
        assert_eq!(row.like_type, LikeType::Sent);
        assert_eq!(row.match_type, MatchType::NoMatch);
        assert_eq!(row.time_between_like_and_match, None);
    }

    #[test]
    fn test_block_met_and_voice_notes() {
        let interaction = RawInteraction {
            blocks: Some(vec![
                BlockEvent {
                    block_type: "remove".to_string(),
                    timestamp: RawTimestamp::from("2023-01-03 08:00:00"),
                },
                BlockEvent {
                    block_type: "report".to_string(),
                    timestamp: RawTimestamp::from("2023-01-04 08:00:00"),
                },
            ]),
            we_met: Some(vec![WeMetEvent {
                did_meet_subject: Some(json!("Not yet")),
                timestamp: None,
            }]),
            voice_notes: Some(vec![json!({}), json!({}), json!({})]),
            ..Default::default()
        };

        let row = InteractionTransformer::transform_one(0, &interaction).unwrap();
        assert_eq!(row.block_type.as_deref(), Some("remove"));
        assert_eq!(row.blocked_timestamp, Some(at(3, 8, 0, 0)));
        assert_eq!(row.met, Some(json!("Not yet")));
        assert_eq!(row.num_voice_notes, 3);
    }

    #[test]
    fn test_structured_instants_are_accepted() {
        let interaction = RawInteraction {
            match_events: Some(vec![MatchEvent {
                timestamp: RawTimestamp::Instant(at(1, 9, 30, 0)),
            }]),
            chats: Some(vec![ChatMessage {
                timestamp: RawTimestamp::Instant(at(1, 10, 0, 0)),
                body: Some("hello".to_string()),
            }]),
            ..Default::default()
        };

        let row = InteractionTransformer::transform_one(0, &interaction).unwrap();
        assert_eq!(row.time_between_match_and_first_message, Some(-1800.0));
    }

    #[test]
    fn test_malformed_chat_timestamp_is_an_error() {
        let result = transform_json(
            r#"[
                {},
                { "chats": [
                    { "timestamp": "2023-01-01 10:00:00" },
                    { "timestamp": "01/01/2023" }
                ]}
            ]"#,
        );

        match result {
            Err(ComputeError::TimestampFormat { index, field, value }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "chats[1].timestamp");
                assert_eq!(value, "01/01/2023");
            }
            other => panic!("expected TimestampFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_like_timestamp_is_an_error() {
        let result = transform_json(r#"[{ "like": [{ "timestamp": "2023/01/01 09:00" }] }]"#);
        assert!(matches!(result, Err(ComputeError::TimestampFormat { .. })));
    }

    #[test]
    fn test_near_miss_timestamps_do_not_produce_rows() {
        for bad in [
            "2023-01-0110:00:00",
            " 2023-01-01 10:00:00",
            "+2023-01-01 10:00:00",
            "2023-01-01 1:2:3",
        ] {
            let json = json!([{ "match": [{ "timestamp": bad }] }]).to_string();
            match transform_json(&json) {
                Err(ComputeError::TimestampFormat { field, value, .. }) => {
                    assert_eq!(field, "match[0].timestamp");
                    assert_eq!(value, bad);
                }
                other => panic!("{bad:?} should be rejected, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_null_chat_timestamp_names_field() {
        let result = transform_json(r#"[{ "chats": [{ "timestamp": null, "body": "hi" }] }]"#);
        match result {
            Err(ComputeError::TimestampFormat { index, field, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(field, "chats[0].timestamp");
            }
            other => panic!("expected TimestampFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_row_count_and_order_preserved() {
        let rows = transform_json(
            r#"[
                { "match": [{ "timestamp": "2023-01-01 09:00:00" }] },
                {},
                { "like": [{ "timestamp": "2023-01-01 09:00:00" }] },
                { "voice_notes": [{}] }
            ]"#,
        )
        .unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].match_type, MatchType::Match);
        assert_eq!(rows[1].match_type, MatchType::NoMatch);
        assert_eq!(rows[2].like_type, LikeType::Sent);
        assert_eq!(rows[3].num_voice_notes, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(InteractionTransformer::transform(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_transform_is_repeatable() {
        let json = r#"[{
            "like": [{ "timestamp": "2023-01-01 09:00:00" }],
            "match": [{ "timestamp": "2023-01-01 09:30:00" }],
            "chats": [
                { "timestamp": "2023-01-01 10:00:00", "body": "hi" },
                { "timestamp": "2023-01-01 10:07:13", "body": "hello again" }
            ]
        }]"#;

        let first = serde_json::to_string(&transform_json(json).unwrap()).unwrap();
        let second = serde_json::to_string(&transform_json(json).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
