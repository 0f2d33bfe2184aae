//! Room-based WebSocket message relay
//!
//! Clients connect, request placement into a room under an allocation
//! policy, then exchange broadcast text messages with everyone else in
//! that room until they disconnect.
//!
//! # Features
//! - Room entry under three allocation policies: CREATE, RANDOM (least
//!   loaded), and ID (exact lookup)
//! - Unique member names per room
//! - Best-effort broadcast with per-recipient fault isolation
//! - Self-healing membership: abrupt disconnects remove the member
//!   through the client's destroy observers
//! - Human-readable room ids (`quiet-harbor-482`)
//!
//! # Architecture
//! The core never touches a socket: sessions talk to the [`Connection`]
//! trait, the WebSocket adapter in [`ws`] implements it, and tests drive
//! whole sessions over in-memory fakes. Shared state is exactly the
//! manager's room index and each room's member set, both behind mutexes
//! held only for check-then-mutate sections.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use room_relay::{handle_connection, RoomManager, WordIdGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let rooms = Arc::new(RoomManager::new(Box::new(WordIdGenerator::new())));
//!     let listener = TcpListener::bind("127.0.0.1:7878").await.unwrap();
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let rooms = Arc::clone(&rooms);
//!         tokio::spawn(handle_connection(stream, rooms));
//!     }
//! }
//! ```

pub mod client;
pub mod conn;
pub mod error;
pub mod idgen;
pub mod manager;
pub mod protocol;
pub mod room;
pub mod session;
pub mod ws;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use client::{Client, DestroyObserver, ObserverId};
pub use conn::Connection;
pub use error::{
    AllocationError, ConnectionError, JoinError, ObserverError, RoomError, SessionError,
    ValidationError,
};
pub use idgen::{IdGenerator, WordIdGenerator};
pub use manager::{RoomManager, RoomPolicy, MAX_ID_ATTEMPTS};
pub use protocol::{parse_entry_request, RoomEntryRequest, RoomRule, ServerEvent};
pub use room::Room;
pub use session::run_session;
pub use ws::handle_connection;
