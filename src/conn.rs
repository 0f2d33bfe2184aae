//! Connection capability trait
//!
//! The seam between the membership/broadcast core and the wire transport.
//! The core only ever talks to this trait; the WebSocket adapter in `ws`
//! and the in-memory fakes used by tests both implement it.

use async_trait::async_trait;

use crate::error::ConnectionError;

/// A duplex text-message channel to one peer
///
/// May fail or close at any point; a gone peer always surfaces as
/// `ConnectionError::Disconnected` rather than a generic fault.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Peer address, for logging only
    fn remote_address(&self) -> String;

    /// Send one text message to the peer
    async fn send(&self, message: &str) -> Result<(), ConnectionError>;

    /// Receive the next text message from the peer
    async fn recv(&self) -> Result<String, ConnectionError>;

    /// Close the connection; closing an already-closed connection is a no-op
    async fn close(&self);
}
