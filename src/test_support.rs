//! In-memory fakes shared by the unit tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::conn::Connection;
use crate::error::ConnectionError;
use crate::idgen::IdGenerator;

/// Records outbound messages; optionally fails every send
pub struct FakeConnection {
    addr: String,
    sent: Mutex<Vec<String>>,
    fail_sends: bool,
    closed: AtomicBool,
}

impl FakeConnection {
    pub fn new(addr: &str) -> Arc<Self> {
        Arc::new(Self {
            addr: addr.to_string(),
            sent: Mutex::new(Vec::new()),
            fail_sends: false,
            closed: AtomicBool::new(false),
        })
    }

    /// A connection whose peer is already gone: every send fails
    pub fn failing(addr: &str) -> Arc<Self> {
        Arc::new(Self {
            addr: addr.to_string(),
            sent: Mutex::new(Vec::new()),
            fail_sends: true,
            closed: AtomicBool::new(false),
        })
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for FakeConnection {
    fn remote_address(&self) -> String {
        self.addr.clone()
    }

    async fn send(&self, message: &str) -> Result<(), ConnectionError> {
        if self.fail_sends || self.is_closed() {
            return Err(ConnectionError::Disconnected);
        }
        self.sent.lock().push(message.to_string());
        Ok(())
    }

    async fn recv(&self) -> Result<String, ConnectionError> {
        Err(ConnectionError::Disconnected)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Generator that always yields the same id, for forcing collisions
pub struct FixedIdGenerator {
    id: String,
}

impl FixedIdGenerator {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl IdGenerator for FixedIdGenerator {
    fn generate(&self) -> String {
        self.id.clone()
    }
}
