//! WebSocket transport adapter
//!
//! Wraps an accepted TCP stream into the `Connection` capability the
//! core consumes. Outbound traffic goes through a per-connection write
//! task fed by a channel, so broadcasts from other sessions never block
//! on this peer's socket.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;
use tracing::debug;

use crate::conn::Connection;
use crate::error::ConnectionError;
use crate::manager::RoomManager;
use crate::session;

/// Outbound channel capacity per connection
const WRITE_BUFFER_SIZE: usize = 32;

#[derive(Debug)]
enum WriteCommand {
    Send(String),
    Close,
}

/// `Connection` implementation over a split WebSocket stream
struct WsConnection {
    peer_addr: String,
    writer: mpsc::Sender<WriteCommand>,
    reader: Mutex<SplitStream<WebSocketStream<TcpStream>>>,
}

#[async_trait::async_trait]
impl Connection for WsConnection {
    fn remote_address(&self) -> String {
        self.peer_addr.clone()
    }

    async fn send(&self, message: &str) -> Result<(), ConnectionError> {
        self.writer
            .send(WriteCommand::Send(message.to_string()))
            .await
            .map_err(|_| ConnectionError::Disconnected)
    }

    async fn recv(&self) -> Result<String, ConnectionError> {
        let mut reader = self.reader.lock().await;
        loop {
            match reader.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.to_string()),
                Some(Ok(Message::Close(_))) | None => return Err(ConnectionError::Disconnected),
                // Ping/pong and binary frames are not part of the protocol
                Some(Ok(_)) => continue,
                Some(Err(
                    WsError::ConnectionClosed
                    | WsError::AlreadyClosed
                    | WsError::Io(_)
                    | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake),
                )) => return Err(ConnectionError::Disconnected),
                Some(Err(e)) => return Err(ConnectionError::Transport(e.to_string())),
            }
        }
    }

    async fn close(&self) {
        let _ = self.writer.send(WriteCommand::Close).await;
    }
}

/// Drain the write channel into the WebSocket sink
///
/// Ends on an explicit close command, a send failure, or all senders
/// dropping; a close frame goes out either way.
async fn write_loop(
    mut sink: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut commands: mpsc::Receiver<WriteCommand>,
) {
    while let Some(cmd) = commands.recv().await {
        match cmd {
            WriteCommand::Send(text) => {
                if sink.send(Message::Text(text.into())).await.is_err() {
                    debug!("WebSocket send failed, ending write task");
                    break;
                }
            }
            WriteCommand::Close => break,
        }
    }
    let _ = sink.close().await;
}

/// Handle one accepted TCP connection
///
/// Performs the WebSocket handshake, wires up the connection adapter,
/// and hands it to the session orchestrator.
pub async fn handle_connection(stream: TcpStream, rooms: Arc<RoomManager>) -> Result<(), WsError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    debug!("New TCP connection from {}", peer_addr);

    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (ws_sender, ws_receiver) = ws_stream.split();

    let (write_tx, write_rx) = mpsc::channel(WRITE_BUFFER_SIZE);
    tokio::spawn(write_loop(ws_sender, write_rx));

    let conn: Arc<dyn Connection> = Arc::new(WsConnection {
        peer_addr,
        writer: write_tx,
        reader: Mutex::new(ws_receiver),
    });
    session::run_session(rooms, conn).await;
    Ok(())
}
