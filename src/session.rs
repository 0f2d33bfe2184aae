//! Session orchestrator
//!
//! Drives one connection through its whole lifecycle: entry validation,
//! room placement, the relay loop, and teardown. This is the only layer
//! that classifies errors and maps them to peer-visible messages; no
//! session fault ever propagates past it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::Client;
use crate::conn::Connection;
use crate::error::{ConnectionError, SessionError};
use crate::manager::{RoomManager, RoomPolicy};
use crate::protocol::{parse_entry_request, ServerEvent};
use crate::room::Room;

/// Run one connection end-to-end
///
/// Stages before a successful join leave no client or room state behind
/// on failure; every path that joins goes through the leave announcement
/// and the idempotent `Client::destroy`.
pub async fn run_session(rooms: Arc<RoomManager>, conn: Arc<dyn Connection>) {
    let addr = conn.remote_address();
    info!("Connection attempt from {}", addr);

    let (name, policy) = match receive_entry_request(conn.as_ref()).await {
        Ok(parts) => parts,
        Err(e) => {
            info!("Entry stage for {} failed: {}", addr, e);
            report_error(conn.as_ref(), &e).await;
            conn.close().await;
            return;
        }
    };

    let (client, room) = match enter_room(&rooms, Arc::clone(&conn), name, policy) {
        Ok(pair) => pair,
        Err(e) => {
            info!("Room entry for {} rejected: {}", addr, e);
            report_error(conn.as_ref(), &e).await;
            conn.close().await;
            return;
        }
    };

    if let Err(e) = relay_messages(&client, &room).await {
        match &e {
            SessionError::Disconnected => {
                info!("Client '{}' disconnected from room {}", client.name(), room.id());
            }
            other => {
                warn!(
                    "Session for '{}' in room {} failed: {}",
                    client.name(),
                    room.id(),
                    other
                );
                report_error(conn.as_ref(), other).await;
            }
        }
    }

    announce_leave(&client, &room).await;
    client.destroy().await;
    info!("Session for {} ended", addr);
}

/// Receive and validate the one entry request
async fn receive_entry_request(
    conn: &dyn Connection,
) -> Result<(String, RoomPolicy), SessionError> {
    let payload = conn.recv().await?;
    let parts = parse_entry_request(&payload)?;
    Ok(parts)
}

/// Allocate a room per policy and join it
///
/// Nothing to unwind on failure: the client only becomes observable once
/// `Room::add` succeeds.
fn enter_room(
    rooms: &RoomManager,
    conn: Arc<dyn Connection>,
    name: String,
    policy: RoomPolicy,
) -> Result<(Arc<Client>, Arc<Room>), SessionError> {
    let room = rooms.allocate(policy)?;
    let client = Client::new(conn, name);
    room.add(&client)?;
    info!("Client {:?} joined room {}", client, room.id());
    Ok((client, room))
}

/// Joined stage: announce, then relay until the peer goes away
///
/// Ends only by error; a disconnect is the normal ending and surfaces as
/// `SessionError::Disconnected`.
async fn relay_messages(client: &Arc<Client>, room: &Arc<Room>) -> Result<(), SessionError> {
    let info = ServerEvent::room_info(room.id());
    client.send(&info.to_json()?).await?;

    let join = ServerEvent::room_join(client.name(), room.size());
    room.broadcast(&join.to_json()?).await;

    loop {
        let text = match client.conn().recv().await {
            Ok(text) => text,
            Err(ConnectionError::Disconnected) => return Err(SessionError::Disconnected),
            Err(ConnectionError::Transport(msg)) => return Err(SessionError::Transport(msg)),
        };

        debug!(
            "Relaying {} bytes from '{}' in room {}",
            text.len(),
            client.name(),
            room.id()
        );
        let event = ServerEvent::room_message(client.name(), &text);
        room.broadcast(&event.to_json()?).await;
    }
}

/// Broadcast the leave event with the post-removal member count
///
/// Runs before `destroy`, so the leaver is still a member here; a dead
/// leaver connection just fails its own send and nobody else's.
async fn announce_leave(client: &Arc<Client>, room: &Arc<Room>) {
    let leave = ServerEvent::room_leave(client.name(), room.size().saturating_sub(1));
    match leave.to_json() {
        Ok(json) => room.broadcast(&json).await,
        Err(e) => warn!("Failed to encode leave event: {}", e),
    }
}

/// Best-effort failure report to the peer
async fn report_error(conn: &dyn Connection, error: &SessionError) {
    let Some(message) = error.peer_message() else {
        return;
    };
    let event = ServerEvent::error(message);
    match event.to_json() {
        Ok(json) => {
            let _ = conn.send(&json).await;
        }
        Err(e) => warn!("Failed to encode error event: {}", e),
    }
}
