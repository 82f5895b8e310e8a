//! Room manager: registry and peer index operations

use super::model::{ConnectionId, ParticipantRole, Peer, PeerLocation, Room, RoomId};
use super::registry::{
    AddPeer, CloseRoom, CreateRoom, DropDanglingEntry, Registry, RemovePeer, Resolution,
};
use parking_lot::RwLock;
use tracing::debug;

/// Owner of all signaling room state.
///
/// Constructed once at startup and shared by reference. Every mutation takes
/// the single write lock for its whole duration, so the room map, the visit
/// index and the connection index change together. Read-only views take the
/// read lock.
#[derive(Debug, Default)]
pub struct RoomManager {
    pub(crate) registry: RwLock<Registry>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
        }
    }

    /// Create a new, empty, active room for `visit_id`.
    ///
    /// If the visit already has an active room it is closed first. Any peers
    /// still in that room are unregistered without a `PeerLeft` notice, so the
    /// host joins through [`RoomManager::get_or_create_room_for_visit`] instead.
    pub fn create_room(&self, visit_id: &str) -> RoomId {
        self.registry.write().apply(CreateRoom {
            visit_id: visit_id.to_string(),
        })
    }

    /// Active room by id. Closed and unknown rooms both yield `None`.
    pub fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        self.registry.read().room(room_id).cloned()
    }

    pub fn get_room_by_visit_id(&self, visit_id: &str) -> Option<Room> {
        self.registry.read().room_for_visit(visit_id).cloned()
    }

    /// Active room for the visit, created on demand.
    ///
    /// Lookup and creation happen under one write lock, so concurrent callers
    /// for the same visit all observe the same room.
    pub fn get_or_create_room_for_visit(&self, visit_id: &str) -> RoomId {
        let mut registry = self.registry.write();
        if let Some(room) = registry.room_for_visit(visit_id) {
            return room.id;
        }
        registry.apply(CreateRoom {
            visit_id: visit_id.to_string(),
        })
    }

    /// Close a room and forget all of its peers. Returns `false` if it was not active.
    pub fn close_room(&self, room_id: &RoomId) -> bool {
        self.registry
            .write()
            .apply(CloseRoom { room_id: *room_id })
            .is_some()
    }

    /// Add a peer to an active room.
    ///
    /// Returns `None` without touching any state if the room is not active or
    /// the connection is already registered in some room.
    pub fn add_peer(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        user_id: &str,
        role: ParticipantRole,
    ) -> Option<Peer> {
        self.registry.write().apply(AddPeer {
            room_id: *room_id,
            connection_id: connection_id.clone(),
            user_id: user_id.to_string(),
            role,
        })
    }

    /// Remove the peer bound to `connection_id`.
    ///
    /// Closes the room in the same step when this was its last peer. Calling
    /// it again for the same connection is a no-op.
    pub fn remove_peer(&self, connection_id: &ConnectionId) -> Option<PeerLocation> {
        let removal = self.registry.write().apply(RemovePeer {
            connection_id: connection_id.clone(),
        })?;
        if removal.room_closed {
            debug!(room_id = %removal.location.room_id, "Closed room after last peer left");
        }
        Some(removal.location)
    }

    /// Peers of an active room in join order; empty for unknown rooms.
    pub fn get_peers_in_room(&self, room_id: &RoomId) -> Vec<Peer> {
        self.registry
            .read()
            .room(room_id)
            .map(|room| room.peers.clone())
            .unwrap_or_default()
    }

    pub fn get_peer_by_connection_id(&self, connection_id: &ConnectionId) -> Option<PeerLocation> {
        let resolution = self.registry.read().resolve(connection_id);
        match resolution {
            Resolution::Found(location) => Some(location),
            Resolution::Unknown => None,
            Resolution::Dangling => {
                self.heal(connection_id);
                None
            }
        }
    }

    /// Drop an index entry found dangling under the read lock.
    ///
    /// Re-checked under the write lock, since a concurrent writer may have
    /// fixed or replaced it in between.
    pub(crate) fn heal(&self, connection_id: &ConnectionId) {
        self.registry.write().apply(DropDanglingEntry {
            connection_id: connection_id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::from(id)
    }

    #[test]
    fn test_create_room_starts_empty_and_active() {
        let manager = RoomManager::new();
        let room_id = manager.create_room("visit-123");

        let room = manager.get_room(&room_id).unwrap();
        assert_eq!(room.id, room_id);
        assert_eq!(room.visit_id, "visit-123");
        assert!(room.is_active);
        assert_eq!(room.peer_count(), 0);
        assert!(room.created_at > 0);
    }

    #[test]
    fn test_create_room_drops_peers_of_superseded_room() {
        let manager = RoomManager::new();
        let first = manager.create_room("visit-1");
        manager
            .add_peer(&first, &conn("sock-a"), "doctor-1", ParticipantRole::Doctor)
            .unwrap();

        let second = manager.create_room("visit-1");

        assert!(manager.get_room(&first).is_none());
        assert!(manager.get_peer_by_connection_id(&conn("sock-a")).is_none());
        assert_eq!(manager.get_room_by_visit_id("visit-1").unwrap().id, second);
        assert!(manager.get_peers_in_room(&second).is_empty());
    }

    #[test]
    fn test_create_room_unique_ids() {
        let manager = RoomManager::new();
        let r1 = manager.create_room("visit-1");
        let r2 = manager.create_room("visit-2");
        assert_ne!(r1, r2);
    }

    #[test]
    fn test_get_or_create_returns_existing_room() {
        let manager = RoomManager::new();
        let created = manager.create_room("visit-123");

        assert_eq!(manager.get_or_create_room_for_visit("visit-123"), created);
        assert_eq!(manager.get_or_create_room_for_visit("visit-123"), created);
    }

    #[test]
    fn test_get_or_create_separates_visits() {
        let manager = RoomManager::new();
        let r1 = manager.get_or_create_room_for_visit("visit-1");
        let r2 = manager.get_or_create_room_for_visit("visit-2");
        assert_ne!(r1, r2);
        assert_eq!(manager.get_room(&r2).unwrap().visit_id, "visit-2");
    }

    #[test]
    fn test_get_or_create_after_close_yields_new_room() {
        let manager = RoomManager::new();
        let r1 = manager.create_room("visit-123");
        assert!(manager.close_room(&r1));

        assert!(manager.get_room(&r1).is_none());
        let r2 = manager.get_or_create_room_for_visit("visit-123");
        assert_ne!(r1, r2);
    }

    #[test]
    fn test_get_or_create_is_atomic_across_threads() {
        let manager = RoomManager::new();

        let ids: Vec<RoomId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| s.spawn(|| manager.get_or_create_room_for_visit("visit-race")))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(manager.registry.read().room_count(), 1);
    }

    #[test]
    fn test_get_room_by_visit_id() {
        let manager = RoomManager::new();
        let room_id = manager.create_room("visit-123");

        assert_eq!(manager.get_room_by_visit_id("visit-123").unwrap().id, room_id);
        assert!(manager.get_room_by_visit_id("visit-404").is_none());

        manager.close_room(&room_id);
        assert!(manager.get_room_by_visit_id("visit-123").is_none());
    }

    #[test]
    fn test_add_peer() {
        let manager = RoomManager::new();
        let room_id = manager.create_room("visit-123");

        let peer = manager
            .add_peer(&room_id, &conn("socket-123"), "user-123", ParticipantRole::Doctor)
            .unwrap();
        assert_eq!(peer.user_id, "user-123");
        assert_eq!(peer.connection_id, conn("socket-123"));
        assert_eq!(peer.role, ParticipantRole::Doctor);
        assert!(peer.joined_at > 0);

        let location = manager.get_peer_by_connection_id(&conn("socket-123")).unwrap();
        assert_eq!(location.room_id, room_id);
        assert_eq!(location.peer, peer);
    }

    #[test]
    fn test_add_peer_to_unknown_or_closed_room() {
        let manager = RoomManager::new();
        assert!(manager
            .add_peer(&RoomId::new(), &conn("socket-1"), "user-1", ParticipantRole::Doctor)
            .is_none());

        let room_id = manager.create_room("visit-123");
        manager.close_room(&room_id);
        assert!(manager
            .add_peer(&room_id, &conn("socket-1"), "user-1", ParticipantRole::Doctor)
            .is_none());
        assert!(manager.get_peer_by_connection_id(&conn("socket-1")).is_none());
        assert!(manager.get_active_rooms().is_empty());
    }

    #[test]
    fn test_same_user_in_two_rooms_gets_distinct_peers() {
        let manager = RoomManager::new();
        let r1 = manager.create_room("visit-1");
        let r2 = manager.create_room("visit-2");

        let p1 = manager
            .add_peer(&r1, &conn("socket-1"), "user-123", ParticipantRole::Doctor)
            .unwrap();
        let p2 = manager
            .add_peer(&r2, &conn("socket-2"), "user-123", ParticipantRole::Patient)
            .unwrap();
        assert_ne!(p1.id, p2.id);
    }

    #[test]
    fn test_remove_peer_keeps_room_with_remaining_peers() {
        let manager = RoomManager::new();
        let room_id = manager.create_room("visit-123");
        manager.add_peer(&room_id, &conn("socket-1"), "user-1", ParticipantRole::Doctor);
        manager.add_peer(&room_id, &conn("socket-2"), "user-2", ParticipantRole::Patient);
        manager.add_peer(&room_id, &conn("socket-3"), "user-3", ParticipantRole::Patient);

        let removed = manager.remove_peer(&conn("socket-2")).unwrap();
        assert_eq!(removed.peer.user_id, "user-2");
        assert_eq!(removed.room_id, room_id);

        let peers = manager.get_peers_in_room(&room_id);
        assert_eq!(peers.len(), 2);
        assert!(peers.iter().all(|p| p.connection_id != conn("socket-2")));
        assert_eq!(manager.get_room(&room_id).unwrap().peer_count(), 2);
        assert!(manager.get_peer_by_connection_id(&conn("socket-2")).is_none());
    }

    #[test]
    fn test_remove_last_peer_closes_room() {
        let manager = RoomManager::new();
        let room_id = manager.create_room("visit-123");
        manager.add_peer(&room_id, &conn("socket-123"), "user-123", ParticipantRole::Doctor);

        assert!(manager.remove_peer(&conn("socket-123")).is_some());
        assert!(manager.get_room(&room_id).is_none());
        assert!(manager.get_room_by_visit_id("visit-123").is_none());
    }

    #[test]
    fn test_remove_peer_is_idempotent() {
        let manager = RoomManager::new();
        assert!(manager.remove_peer(&conn("socket-404")).is_none());

        let room_id = manager.create_room("visit-123");
        manager.add_peer(&room_id, &conn("socket-1"), "user-1", ParticipantRole::Doctor);
        manager.add_peer(&room_id, &conn("socket-2"), "user-2", ParticipantRole::Patient);

        assert!(manager.remove_peer(&conn("socket-1")).is_some());
        assert!(manager.remove_peer(&conn("socket-1")).is_none());
        assert_eq!(manager.get_peers_in_room(&room_id).len(), 1);
    }

    #[test]
    fn test_get_peers_in_room_join_order() {
        let manager = RoomManager::new();
        let room_id = manager.create_room("visit-123");
        assert!(manager.get_peers_in_room(&room_id).is_empty());
        assert!(manager.get_peers_in_room(&RoomId::new()).is_empty());

        manager.add_peer(&room_id, &conn("socket-1"), "user-1", ParticipantRole::Doctor);
        manager.add_peer(&room_id, &conn("socket-2"), "user-2", ParticipantRole::Patient);

        let peers = manager.get_peers_in_room(&room_id);
        assert_eq!(peers[0].user_id, "user-1");
        assert_eq!(peers[1].user_id, "user-2");
    }

    #[test]
    fn test_close_room_drops_peer_index_entries() {
        let manager = RoomManager::new();
        let room_id = manager.create_room("visit-123");
        manager.add_peer(&room_id, &conn("socket-1"), "user-1", ParticipantRole::Doctor);
        manager.add_peer(&room_id, &conn("socket-2"), "user-2", ParticipantRole::Patient);

        assert!(manager.close_room(&room_id));
        assert!(!manager.close_room(&room_id));
        assert!(!manager.close_room(&RoomId::new()));

        assert!(manager.get_room(&room_id).is_none());
        assert!(manager.get_peer_by_connection_id(&conn("socket-1")).is_none());
        assert!(manager.get_peer_by_connection_id(&conn("socket-2")).is_none());
        assert!(manager.remove_peer(&conn("socket-1")).is_none());
    }

    #[test]
    fn test_connection_reusable_after_close() {
        let manager = RoomManager::new();
        let r1 = manager.create_room("visit-1");
        manager.add_peer(&r1, &conn("socket-1"), "user-1", ParticipantRole::Doctor);
        manager.close_room(&r1);

        let r2 = manager.create_room("visit-2");
        assert!(manager
            .add_peer(&r2, &conn("socket-1"), "user-1", ParticipantRole::Doctor)
            .is_some());
    }

    #[test]
    fn test_dangling_index_entry_is_healed_on_lookup() {
        let manager = RoomManager::new();
        manager
            .registry
            .write()
            .corrupt_index(conn("ghost"), RoomId::new());

        assert!(manager.get_peer_by_connection_id(&conn("ghost")).is_none());
        assert_eq!(manager.registry.read().connection_count(), 0);
        assert!(manager.registry.read().is_consistent());
    }
}
