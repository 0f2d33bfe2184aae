//! RoomManager: room index and allocation policies
//!
//! A process-wide index from room id to room, constructed explicitly and
//! handed to the session layer, never a global. Ids assigned to distinct
//! rooms stay unique for the process lifetime because rooms are never
//! evicted from the index.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::AllocationError;
use crate::idgen::IdGenerator;
use crate::room::Room;

/// Bound on id-generation retries before an allocation fails loudly
///
/// A safety net against a degenerate generator, not an expected path.
pub const MAX_ID_ATTEMPTS: usize = 1000;

/// How a newcomer gets a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomPolicy {
    /// Always allocate a brand-new room
    Create,
    /// Steer to the least-loaded existing room, or create the first one
    Random,
    /// Join an existing room by exact id
    ById(String),
}

/// Creates rooms and indexes them by id
pub struct RoomManager {
    id_generator: Box<dyn IdGenerator>,
    rooms: Mutex<HashMap<String, Arc<Room>>>,
}

impl RoomManager {
    pub fn new(id_generator: Box<dyn IdGenerator>) -> Self {
        Self {
            id_generator,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate a room according to `policy`
    ///
    /// `Random` is a greedy approximation: it only steers new joins to
    /// the currently smallest room, it never rebalances existing members.
    pub fn allocate(&self, policy: RoomPolicy) -> Result<Arc<Room>, AllocationError> {
        match policy {
            RoomPolicy::Create => self.create_room(),
            RoomPolicy::Random => match self.choose_least() {
                Some(room) => Ok(room),
                None => self.create_room(),
            },
            RoomPolicy::ById(id) => self.select_by_id(&id),
        }
    }

    /// Create a new room with a freshly generated unique id
    pub fn create_room(&self) -> Result<Arc<Room>, AllocationError> {
        // Lock held across generate-check-insert so two concurrent
        // creates can never claim the same id.
        let mut rooms = self.rooms.lock();

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.id_generator.generate();
            if rooms.contains_key(&id) {
                debug!("Room id '{}' collided, retrying", id);
                continue;
            }
            let room = Room::new(id.clone());
            rooms.insert(id.clone(), Arc::clone(&room));
            info!("Created room {} (total rooms: {})", id, rooms.len());
            return Ok(room);
        }
        Err(AllocationError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
    }

    /// Room with the minimum current member count, if any exists
    fn choose_least(&self) -> Option<Arc<Room>> {
        let rooms = self.rooms.lock();
        rooms
            .values()
            .min_by_key(|room| room.size())
            .map(Arc::clone)
    }

    /// Look up an existing room by exact id
    pub fn select_by_id(&self, id: &str) -> Result<Arc<Room>, AllocationError> {
        let rooms = self.rooms.lock();
        rooms
            .get(id)
            .map(Arc::clone)
            .ok_or_else(|| AllocationError::NoRoomWithId(id.to_string()))
    }

    /// Whether `id` is occupied by any room
    pub fn has_id(&self, id: &str) -> bool {
        self.rooms.lock().contains_key(id)
    }

    /// Number of indexed rooms
    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }
}
