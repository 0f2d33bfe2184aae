//! Client: one named participant bound to one connection
//!
//! A client owns its connection exclusively; nothing else sends or
//! receives on it directly. Teardown is a one-time, idempotent event
//! that notifies registered observers before the connection closes,
//! which is how rooms self-heal their membership on abrupt disconnects.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::conn::Connection;
use crate::error::{ConnectionError, ObserverError};

/// Handle returned by `register_on_destroy`, used to unregister
pub type ObserverId = u64;

/// Observer invoked synchronously while the client is being destroyed
///
/// Observers may still read the client's name and send on its connection
/// during the notification, and may unregister themselves.
pub type DestroyObserver = Arc<dyn Fn(&Arc<Client>) + Send + Sync>;

struct ClientState {
    active: bool,
    next_observer_id: ObserverId,
    observers: Vec<(ObserverId, DestroyObserver)>,
}

/// A connected participant
///
/// The name is chosen at entry and immutable afterwards. A client is
/// active from construction until the first `destroy` call.
pub struct Client {
    name: String,
    conn: Arc<dyn Connection>,
    state: Mutex<ClientState>,
}

impl Client {
    /// Construct an active client over `conn`
    pub fn new(conn: Arc<dyn Connection>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            conn,
            state: Mutex::new(ClientState {
                active: true,
                next_observer_id: 0,
                observers: Vec::new(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conn(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Send one message over the client's connection
    pub async fn send(&self, message: &str) -> Result<(), ConnectionError> {
        self.conn.send(message).await
    }

    /// Subscribe `observer` to the destroy event
    ///
    /// Observers run in registration order.
    pub fn register_on_destroy(&self, observer: DestroyObserver) -> ObserverId {
        let mut state = self.state.lock();
        let id = state.next_observer_id;
        state.next_observer_id += 1;
        state.observers.push((id, observer));
        id
    }

    /// Unsubscribe a previously registered observer
    ///
    /// An unknown id signals a bookkeeping bug upstream: room membership
    /// and observer registration must stay paired 1:1.
    pub fn unregister_on_destroy(&self, id: ObserverId) -> Result<(), ObserverError> {
        let mut state = self.state.lock();
        let pos = state
            .observers
            .iter()
            .position(|(observer_id, _)| *observer_id == id)
            .ok_or(ObserverError::NotRegistered)?;
        state.observers.remove(pos);
        Ok(())
    }

    /// Fire the destroy event: notify observers, then close the connection
    ///
    /// Idempotent: the first call claims the active flag, so later calls
    /// (and a concurrent second call) are no-ops. Observers are invoked
    /// from a snapshot, so they may unregister themselves or each other
    /// mid-notification.
    pub async fn destroy(self: &Arc<Self>) {
        let snapshot: Vec<DestroyObserver> = {
            let mut state = self.state.lock();
            if !state.active {
                return;
            }
            state.active = false;
            state
                .observers
                .iter()
                .map(|(_, observer)| Arc::clone(observer))
                .collect()
        };

        for observer in snapshot {
            observer(self);
        }

        self.conn.close().await;
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.name)
            .field("addr", &self.conn.remote_address())
            .finish()
    }
}
