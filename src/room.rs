//! Room: a set of active clients sharing a broadcast channel
//!
//! Invariants: no two members share a name (case-sensitive), and an
//! inactive client never enters. Membership self-heals on abrupt
//! disconnects through the client's destroy observer, so the room never
//! needs an explicit remove call from the session for that path.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::warn;

use crate::client::{Client, ObserverId};
use crate::error::{JoinError, RoomError};

struct Member {
    client: Arc<Client>,
    observer: ObserverId,
}

/// Client container with a broadcast capability
///
/// Constructed only by `RoomManager`. Rooms are never destroyed; an
/// emptied room stays indexed and selectable.
pub struct Room {
    id: String,
    members: Mutex<Vec<Member>>,
}

impl Room {
    pub(crate) fn new(id: String) -> Arc<Self> {
        Arc::new(Self {
            id,
            members: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add `client` to the room
    ///
    /// Registers the room's removal routine as a destroy observer of the
    /// client, paired 1:1 with the membership. The observer holds only a
    /// `Weak` back-reference, so no ownership cycle forms between room
    /// and client.
    pub fn add(self: &Arc<Self>, client: &Arc<Client>) -> Result<(), JoinError> {
        // Lock held across check-then-insert to keep the unique-name
        // invariant under concurrent joins.
        let mut members = self.members.lock();

        if !client.is_active() {
            return Err(JoinError::InactiveClient);
        }
        if members.iter().any(|m| m.client.name() == client.name()) {
            return Err(JoinError::NameOccupied(client.name().to_string()));
        }

        let room = Arc::downgrade(self);
        let observer = client.register_on_destroy(Arc::new(move |client| {
            Self::remove_on_destroy(&room, client);
        }));
        members.push(Member {
            client: Arc::clone(client),
            observer,
        });
        Ok(())
    }

    /// Remove a current member
    ///
    /// Errors with `NotAMember` for an absent client; callers going
    /// through `Client::destroy` never hit that, because the observer
    /// exists only while the membership does.
    pub fn remove(&self, client: &Arc<Client>) -> Result<(), RoomError> {
        let member = {
            let mut members = self.members.lock();
            let pos = members
                .iter()
                .position(|m| Arc::ptr_eq(&m.client, client))
                .ok_or(RoomError::NotAMember)?;
            members.remove(pos)
        };
        member.client.unregister_on_destroy(member.observer)?;
        Ok(())
    }

    fn remove_on_destroy(room: &Weak<Room>, client: &Arc<Client>) {
        let Some(room) = room.upgrade() else {
            return;
        };
        if let Err(e) = room.remove(client) {
            warn!(
                "Destroy-observer removal of '{}' from room {} failed: {}",
                client.name(),
                room.id,
                e
            );
        }
    }

    /// Send `message` to every current member
    ///
    /// The recipient set is a snapshot taken atomically under the member
    /// lock; a failed send to one member never suppresses delivery to
    /// the others. A dead peer gets cleaned up by its own session's
    /// teardown, not here.
    pub async fn broadcast(&self, message: &str) {
        let recipients: Vec<Arc<Client>> = {
            let members = self.members.lock();
            members.iter().map(|m| Arc::clone(&m.client)).collect()
        };

        for client in recipients {
            if let Err(e) = client.send(message).await {
                warn!(
                    "Broadcast to '{}' in room {} failed: {}",
                    client.name(),
                    self.id,
                    e
                );
            }
        }
    }

    /// Whether a member with `name` is present (exact, case-sensitive)
    pub fn has_name(&self, name: &str) -> bool {
        self.members.lock().iter().any(|m| m.client.name() == name)
    }

    /// Current member count
    pub fn size(&self) -> usize {
        self.members.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conn::Connection;
    use crate::test_support::FakeConnection;

    fn client(name: &str) -> Arc<Client> {
        Client::new(FakeConnection::new("127.0.0.1:1000"), name)
    }

    #[tokio::test]
    async fn test_add_and_size() {
        let room = Room::new("quiet-harbor-001".to_string());

        let alice = client("alice");
        let bob = client("bob");
        room.add(&alice).unwrap();
        room.add(&bob).unwrap();

        assert_eq!(room.size(), 2);
        assert!(room.has_name("alice"));
        assert!(room.has_name("bob"));
        assert!(!room.has_name("Alice")); // case-sensitive
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate_name() {
        let room = Room::new("quiet-harbor-001".to_string());

        room.add(&client("eve")).unwrap();
        let result = room.add(&client("eve"));

        assert!(matches!(result, Err(JoinError::NameOccupied(name)) if name == "eve"));
        assert_eq!(room.size(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_inactive_client() {
        let room = Room::new("quiet-harbor-001".to_string());

        let ghost = client("ghost");
        ghost.destroy().await;

        assert!(matches!(room.add(&ghost), Err(JoinError::InactiveClient)));
        assert_eq!(room.size(), 0);
    }

    #[tokio::test]
    async fn test_remove_absent_client_is_an_error() {
        let room = Room::new("quiet-harbor-001".to_string());

        let outsider = client("outsider");
        assert!(matches!(room.remove(&outsider), Err(RoomError::NotAMember)));
    }

    #[tokio::test]
    async fn test_remove_unregisters_observer() {
        let room = Room::new("quiet-harbor-001".to_string());

        let alice = client("alice");
        room.add(&alice).unwrap();
        room.remove(&alice).unwrap();
        assert_eq!(room.size(), 0);

        // Destroying after removal must not touch the room again.
        alice.destroy().await;
        assert_eq!(room.size(), 0);
    }

    #[tokio::test]
    async fn test_destroy_self_heals_membership() {
        let room = Room::new("quiet-harbor-001".to_string());

        let alice = client("alice");
        let bob = client("bob");
        room.add(&alice).unwrap();
        room.add(&bob).unwrap();

        alice.destroy().await;

        assert_eq!(room.size(), 1);
        assert!(!room.has_name("alice"));
        assert!(room.has_name("bob"));

        // Name becomes free for a newcomer once the holder is gone.
        room.add(&client("alice")).unwrap();
        assert_eq!(room.size(), 2);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_member() {
        let room = Room::new("quiet-harbor-001".to_string());

        let conns: Vec<Arc<FakeConnection>> = (0..3)
            .map(|i| FakeConnection::new(&format!("127.0.0.1:{}", 1000 + i)))
            .collect();
        for (i, conn) in conns.iter().enumerate() {
            let member = Client::new(Arc::clone(conn) as Arc<dyn Connection>, format!("user-{}", i));
            room.add(&member).unwrap();
        }

        room.broadcast("hello room").await;

        for conn in &conns {
            assert_eq!(conn.sent(), vec!["hello room".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_broadcast_isolates_member_failures() {
        let room = Room::new("quiet-harbor-001".to_string());

        let healthy = FakeConnection::new("127.0.0.1:1000");
        let broken = FakeConnection::failing("127.0.0.1:1001");
        let also_healthy = FakeConnection::new("127.0.0.1:1002");

        room.add(&Client::new(Arc::clone(&healthy) as Arc<dyn Connection>, "a"))
            .unwrap();
        room.add(&Client::new(Arc::clone(&broken) as Arc<dyn Connection>, "b"))
            .unwrap();
        room.add(&Client::new(
            Arc::clone(&also_healthy) as Arc<dyn Connection>,
            "c",
        ))
        .unwrap();

        room.broadcast("still standing").await;

        assert_eq!(healthy.sent(), vec!["still standing".to_string()]);
        assert!(broken.sent().is_empty());
        assert_eq!(also_healthy.sent(), vec!["still standing".to_string()]);
    }
}
