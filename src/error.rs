//! Error types for the relay
//!
//! One narrow error enum per layer; the session orchestrator is the only
//! place that classifies them into peer-visible messages.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Connection-level errors surfaced by the transport adapter
///
/// A lost peer is a distinguished condition, not a generic fault:
/// the session loop short-circuits on it and goes straight to teardown.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Peer closed the connection or the link dropped
    #[error("peer disconnected")]
    Disconnected,

    /// Any other transport fault
    #[error("transport error: {0}")]
    Transport(String),
}

/// Entry request validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Malformed JSON, missing key, wrong field type, or unknown room rule
    #[error("malformed entry payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// `room_rule` is `ID` but no `room_id` was supplied
    #[error("'room_id' field is required for the ID rule")]
    MissingRoomId,
}

/// Errors from `Room::add`
#[derive(Debug, Error)]
pub enum JoinError {
    /// The client was destroyed before the join
    #[error("cannot add an inactive client")]
    InactiveClient,

    /// Another member of the room already uses this name
    #[error("name '{0}' is occupied in this room")]
    NameOccupied(String),
}

/// Errors from `Room::remove` and the observer bookkeeping behind it
#[derive(Debug, Error)]
pub enum RoomError {
    /// The client is not currently a member
    #[error("client is not a member of this room")]
    NotAMember,

    /// Membership and observer registration fell out of sync
    #[error(transparent)]
    Observer(#[from] ObserverError),
}

/// Errors from the client's destroy-observer registry
#[derive(Debug, Error)]
pub enum ObserverError {
    /// Unregistering an observer id that was never registered
    #[error("observer is not registered")]
    NotRegistered,
}

/// Errors from `RoomManager::allocate`
#[derive(Debug, Error)]
pub enum AllocationError {
    /// `ById` lookup found no room
    #[error("no room with id '{0}'")]
    NoRoomWithId(String),

    /// The id generator kept colliding with live rooms
    #[error("failed to generate a unique room id after {0} attempts")]
    IdSpaceExhausted(usize),
}

/// Session-level classification of everything that can end a session
///
/// Built by the orchestrator from the layer errors above; `peer_message`
/// is the single mapping to user-visible text.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Peer went away; terminates the session, never reported back
    #[error("client disconnected")]
    Disconnected,

    /// Entry request failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Room allocation failed
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Room entry failed
    #[error(transparent)]
    Join(#[from] JoinError),

    /// Outbound event failed to serialize
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// Non-disconnect transport fault
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<ConnectionError> for SessionError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::Disconnected => SessionError::Disconnected,
            ConnectionError::Transport(msg) => SessionError::Transport(msg),
        }
    }
}

impl SessionError {
    /// Terse, categorical message for the peer
    ///
    /// `None` means there is nothing to report to (the peer is gone).
    /// Internal detail never leaks here.
    pub fn peer_message(&self) -> Option<&'static str> {
        match self {
            SessionError::Disconnected => None,
            SessionError::Validation(_) => Some("JSON payload is invalid"),
            SessionError::Allocation(AllocationError::NoRoomWithId(_)) => {
                Some("No room with ID found")
            }
            SessionError::Join(JoinError::NameOccupied(_)) => Some("Name is occupied"),
            _ => Some("Unknown error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_is_never_reported() {
        assert!(SessionError::Disconnected.peer_message().is_none());
    }

    #[test]
    fn test_peer_messages_are_categorical() {
        let err = SessionError::from(JoinError::NameOccupied("eve".to_string()));
        assert_eq!(err.peer_message(), Some("Name is occupied"));

        let err = SessionError::from(AllocationError::NoRoomWithId("x".to_string()));
        assert_eq!(err.peer_message(), Some("No room with ID found"));

        let err = SessionError::from(AllocationError::IdSpaceExhausted(1000));
        assert_eq!(err.peer_message(), Some("Unknown error"));
    }
}
