//! Room relay server - entry point
//!
//! Starts the TCP listener and accepts WebSocket connections, one
//! session task per peer.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use room_relay::{handle_connection, RoomManager, WordIdGenerator};

/// Default bind address
const DEFAULT_ADDR: &str = "127.0.0.1:7878";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG to control log level, e.g. RUST_LOG=room_relay=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("room_relay=info")),
        )
        .init();

    // Bind address from command line or default
    let addr = env::args().nth(1).unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let listener = TcpListener::bind(&addr).await?;
    info!("Room relay listening on {}", addr);

    let rooms = Arc::new(RoomManager::new(Box::new(WordIdGenerator::new())));

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!("New connection from {}", peer);
                let rooms = Arc::clone(&rooms);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, rooms).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
