//! Wire protocol: entry request and outbound events
//!
//! JSON shapes shared with clients. One entry request arrives before the
//! receive loop starts; everything outbound is a tagged event object,
//! one per message.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::manager::RoomPolicy;

/// Room allocation rule as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomRule {
    Create,
    Random,
    Id,
}

/// The one request a peer sends before entering the message loop
///
/// `room_id` is required iff `room_rule` is `ID`; extraneous fields are
/// ignored.
#[derive(Debug, Deserialize)]
pub struct RoomEntryRequest {
    pub name: String,
    pub room_rule: RoomRule,
    #[serde(default)]
    pub room_id: Option<String>,
}

impl RoomEntryRequest {
    /// Split into the chosen name and a concrete allocation policy
    pub fn into_parts(self) -> Result<(String, RoomPolicy), ValidationError> {
        let policy = match self.room_rule {
            RoomRule::Create => RoomPolicy::Create,
            RoomRule::Random => RoomPolicy::Random,
            RoomRule::Id => {
                RoomPolicy::ById(self.room_id.ok_or(ValidationError::MissingRoomId)?)
            }
        };
        Ok((self.name, policy))
    }
}

/// Parse and validate a raw entry payload
pub fn parse_entry_request(payload: &str) -> Result<(String, RoomPolicy), ValidationError> {
    let request: RoomEntryRequest = serde_json::from_str(payload)?;
    request.into_parts()
}

/// Server → peer event
///
/// Tagged on `"event"` with SCREAMING_SNAKE_CASE names, matching the
/// wire contract exactly.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    /// To the joining peer only, right after a successful join
    RoomInfo { room_id: String },
    /// A member joined; count is the post-add room size
    RoomJoin {
        sender: String,
        online_count: usize,
        timestamp: String,
    },
    /// A member's text, relayed to the whole room
    RoomMessage {
        sender: String,
        message: String,
        timestamp: String,
    },
    /// A member left; count is the post-removal room size
    RoomLeave {
        sender: String,
        online_count: usize,
        timestamp: String,
    },
    /// Terse failure report, sent best-effort before closing
    Error { message: String },
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl ServerEvent {
    pub fn room_info(room_id: &str) -> Self {
        ServerEvent::RoomInfo {
            room_id: room_id.to_string(),
        }
    }

    pub fn room_join(sender: &str, online_count: usize) -> Self {
        ServerEvent::RoomJoin {
            sender: sender.to_string(),
            online_count,
            timestamp: timestamp_now(),
        }
    }

    pub fn room_message(sender: &str, message: &str) -> Self {
        ServerEvent::RoomMessage {
            sender: sender.to_string(),
            message: message.to_string(),
            timestamp: timestamp_now(),
        }
    }

    pub fn room_leave(sender: &str, online_count: usize) -> Self {
        ServerEvent::RoomLeave {
            sender: sender.to_string(),
            online_count,
            timestamp: timestamp_now(),
        }
    }

    pub fn error(message: &str) -> Self {
        ServerEvent::Error {
            message: message.to_string(),
        }
    }

    /// Encode for the wire
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
