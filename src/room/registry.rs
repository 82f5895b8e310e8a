//! Room registry and reverse peer index
//!
//! Both structures live in one [`Registry`] and are only ever changed through
//! [`Registry::apply`], so a connection id in the index always points at a peer
//! that is present in its room.

use super::model::{ConnectionId, ParticipantRole, Peer, PeerId, PeerLocation, Room, RoomId};
use std::collections::HashMap;
use tracing::{info, warn};

/// A state change applied to the registry as one unit.
pub(crate) trait Mutation {
    type Output;

    fn run(self, registry: &mut Registry) -> Self::Output;
}

/// Result of resolving a connection id through the reverse index.
#[derive(Debug)]
pub(crate) enum Resolution {
    Found(PeerLocation),
    Unknown,
    /// Index entry exists but its room or peer is gone.
    Dangling,
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// Active rooms (room_id -> Room)
    rooms: HashMap<RoomId, Room>,
    /// Active room per visit (visit_id -> room_id)
    by_visit: HashMap<String, RoomId>,
    /// Reverse index (connection_id -> (room_id, peer_id))
    peer_index: HashMap<ConnectionId, (RoomId, PeerId)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single entry point for every mutation.
    pub fn apply<M: Mutation>(&mut self, mutation: M) -> M::Output {
        let output = mutation.run(self);
        debug_assert!(self.is_consistent(), "registry maps diverged");
        output
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id).filter(|room| room.is_active)
    }

    pub fn room_for_visit(&self, visit_id: &str) -> Option<&Room> {
        self.by_visit
            .get(visit_id)
            .and_then(|room_id| self.room(room_id))
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values().filter(|room| room.is_active)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.peer_index.len()
    }

    pub fn resolve(&self, connection_id: &ConnectionId) -> Resolution {
        let Some((room_id, peer_id)) = self.peer_index.get(connection_id) else {
            return Resolution::Unknown;
        };
        let peer = self
            .room(room_id)
            .and_then(|room| room.peer(peer_id))
            .filter(|peer| &peer.connection_id == connection_id);

        match peer {
            Some(peer) => Resolution::Found(PeerLocation {
                peer: peer.clone(),
                room_id: *room_id,
            }),
            None => Resolution::Dangling,
        }
    }

    /// Checks that all three maps agree with each other.
    pub fn is_consistent(&self) -> bool {
        let index_ok = self.peer_index.iter().all(|(conn, (room_id, peer_id))| {
            self.rooms
                .get(room_id)
                .and_then(|room| room.peer(peer_id))
                .is_some_and(|peer| &peer.connection_id == conn)
        });
        let peers_ok = self.rooms.iter().all(|(room_id, room)| {
            room.peers.iter().all(|peer| {
                self.peer_index.get(&peer.connection_id) == Some(&(*room_id, peer.id))
            })
        });
        let visits_ok = self.by_visit.iter().all(|(visit_id, room_id)| {
            self.rooms
                .get(room_id)
                .is_some_and(|room| &room.visit_id == visit_id)
        });
        index_ok && peers_ok && visits_ok
    }

    fn close(&mut self, room_id: &RoomId) -> Option<Room> {
        let mut room = self.rooms.remove(room_id)?;
        room.is_active = false;

        if self.by_visit.get(&room.visit_id) == Some(room_id) {
            self.by_visit.remove(&room.visit_id);
        }
        for peer in &room.peers {
            self.peer_index.remove(&peer.connection_id);
        }

        info!(
            room_id = %room_id,
            visit_id = %room.visit_id,
            peers = room.peers.len(),
            "Room closed"
        );
        Some(room)
    }

    #[cfg(test)]
    pub(crate) fn room_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    #[cfg(test)]
    pub(crate) fn corrupt_index(&mut self, connection_id: ConnectionId, room_id: RoomId) {
        self.peer_index.insert(connection_id, (room_id, PeerId::new()));
    }
}

/// Creates a fresh room and makes it the visit's active room.
///
/// A room already active for the same visit is closed first.
pub(crate) struct CreateRoom {
    pub visit_id: String,
}

impl Mutation for CreateRoom {
    type Output = RoomId;

    fn run(self, registry: &mut Registry) -> RoomId {
        if let Some(previous) = registry.by_visit.get(&self.visit_id).copied() {
            warn!(
                visit_id = %self.visit_id,
                room_id = %previous,
                "Superseding active room for visit"
            );
            registry.close(&previous);
        }

        let room = Room::new(self.visit_id);
        let room_id = room.id;
        info!(room_id = %room_id, visit_id = %room.visit_id, "Room created");

        registry.by_visit.insert(room.visit_id.clone(), room_id);
        registry.rooms.insert(room_id, room);
        room_id
    }
}

pub(crate) struct AddPeer {
    pub room_id: RoomId,
    pub connection_id: ConnectionId,
    pub user_id: String,
    pub role: ParticipantRole,
}

impl Mutation for AddPeer {
    type Output = Option<Peer>;

    fn run(self, registry: &mut Registry) -> Option<Peer> {
        match registry.resolve(&self.connection_id) {
            Resolution::Found(_) => return None,
            Resolution::Dangling => {
                registry.peer_index.remove(&self.connection_id);
                warn!(
                    connection_id = %self.connection_id,
                    "Dropped dangling peer index entry before join"
                );
            }
            Resolution::Unknown => {}
        }
        let room = registry
            .rooms
            .get_mut(&self.room_id)
            .filter(|room| room.is_active)?;

        let peer = Peer::new(self.connection_id, self.user_id, self.role);
        room.peers.push(peer.clone());
        registry
            .peer_index
            .insert(peer.connection_id.clone(), (self.room_id, peer.id));

        info!(
            room_id = %self.room_id,
            peer_id = %peer.id,
            connection_id = %peer.connection_id,
            role = %peer.role,
            "Peer joined room"
        );
        Some(peer)
    }
}

/// Removes a peer; closes its room when it was the last one.
pub(crate) struct RemovePeer {
    pub connection_id: ConnectionId,
}

pub(crate) struct PeerRemoval {
    pub location: PeerLocation,
    pub room_closed: bool,
}

impl Mutation for RemovePeer {
    type Output = Option<PeerRemoval>;

    fn run(self, registry: &mut Registry) -> Option<PeerRemoval> {
        let (room_id, peer_id) = registry.peer_index.remove(&self.connection_id)?;

        let Some(room) = registry.rooms.get_mut(&room_id) else {
            warn!(
                connection_id = %self.connection_id,
                room_id = %room_id,
                "Peer index pointed at a missing room, entry dropped"
            );
            return None;
        };
        let Some(peer) = room.remove_peer(&peer_id) else {
            warn!(
                connection_id = %self.connection_id,
                room_id = %room_id,
                "Peer index pointed at a missing peer, entry dropped"
            );
            return None;
        };

        let remaining = room.peers.len();
        info!(
            room_id = %room_id,
            peer_id = %peer.id,
            connection_id = %self.connection_id,
            remaining,
            "Peer left room"
        );

        let room_closed = remaining == 0 && registry.close(&room_id).is_some();
        Some(PeerRemoval {
            location: PeerLocation { peer, room_id },
            room_closed,
        })
    }
}

pub(crate) struct CloseRoom {
    pub room_id: RoomId,
}

impl Mutation for CloseRoom {
    type Output = Option<Room>;

    fn run(self, registry: &mut Registry) -> Option<Room> {
        registry.close(&self.room_id)
    }
}

/// Closes a room only if it is still empty and was created at or before `created_before`.
pub(crate) struct ReclaimIdleRoom {
    pub room_id: RoomId,
    pub created_before: u64,
}

impl Mutation for ReclaimIdleRoom {
    type Output = bool;

    fn run(self, registry: &mut Registry) -> bool {
        let idle = registry
            .room(&self.room_id)
            .is_some_and(|room| room.is_empty() && room.created_at < self.created_before);
        idle && registry.close(&self.room_id).is_some()
    }
}

/// Drops a reverse index entry whose room or peer no longer exists.
pub(crate) struct DropDanglingEntry {
    pub connection_id: ConnectionId,
}

impl Mutation for DropDanglingEntry {
    type Output = bool;

    fn run(self, registry: &mut Registry) -> bool {
        if !matches!(registry.resolve(&self.connection_id), Resolution::Dangling) {
            return false;
        }
        registry.peer_index.remove(&self.connection_id);
        warn!(
            connection_id = %self.connection_id,
            "Dropped dangling peer index entry"
        );
        true
    }
}
