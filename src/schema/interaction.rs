//! Raw interaction record definition
//!
//! One record of the matches export. Every sub-record group is optional and
//! its absence carries meaning:
//! - no `match` group: no match formed
//! - no `like` group: the like was received, not sent
//! - no `chats` group: no conversation took place
//!
//! A timestamp slot holding anything but a string is kept as
//! [`RawTimestamp::Malformed`] and rejected later with its field path.
//!
//! Only the first element of the `match`, `like`, `block` and `we_met`
//! groups is consulted. An empty group is treated exactly like an absent one.

use crate::timestamp::RawTimestamp;
use serde::{Deserialize, Serialize};

/// Match formation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    #[serde(default = "RawTimestamp::missing")]
    pub timestamp: RawTimestamp,
}

/// Like sent by the export owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeEvent {
    #[serde(default = "RawTimestamp::missing")]
    pub timestamp: RawTimestamp,
    /// Comment attached to the like, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Block or unmatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEvent {
    /// Block classification as written by the app (e.g. "remove")
    pub block_type: String,
    #[serde(default = "RawTimestamp::missing")]
    pub timestamp: RawTimestamp,
}

/// "We met" survey answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeMetEvent {
    /// Answer as written by the app ("Yes", "No", "Not yet", ...), passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did_meet_subject: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RawTimestamp>,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default = "RawTimestamp::missing")]
    pub timestamp: RawTimestamp,
    /// Message text; a message without a body counts as zero words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// One interaction from the export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInteraction {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_events: Option<Vec<MatchEvent>>,
    #[serde(rename = "like", default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Vec<LikeEvent>>,
    #[serde(rename = "block", default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<BlockEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub we_met: Option<Vec<WeMetEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chats: Option<Vec<ChatMessage>>,
    /// Only the number of voice notes is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_notes: Option<Vec<serde_json::Value>>,
}

impl RawInteraction {
    pub fn first_match(&self) -> Option<&MatchEvent> {
        first_of(&self.match_events)
    }

    pub fn first_like(&self) -> Option<&LikeEvent> {
        first_of(&self.likes)
    }

    pub fn first_block(&self) -> Option<&BlockEvent> {
        first_of(&self.blocks)
    }

    pub fn first_we_met(&self) -> Option<&WeMetEvent> {
        first_of(&self.we_met)
    }

    /// Chat messages, empty when the group is absent
    pub fn chat_messages(&self) -> &[ChatMessage] {
        self.chats.as_deref().unwrap_or(&[])
    }

    pub fn voice_note_count(&self) -> usize {
        self.voice_notes.as_ref().map_or(0, Vec::len)
    }
}

fn first_of<T>(group: &Option<Vec<T>>) -> Option<&T> {
    group.as_ref().and_then(|items| items.first())
}
