//! Read-only room views for the operational API

use super::manager::RoomManager;
use super::model::{elapsed_seconds, now_millis, ParticipantRole, Peer, PeerId, Room, RoomId};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PeerStats {
    pub id: PeerId,
    pub user_id: String,
    pub role: ParticipantRole,
    pub joined_at: u64,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomStats {
    pub room_id: RoomId,
    pub visit_id: String,
    pub peer_count: usize,
    pub is_active: bool,
    pub created_at: u64,
    pub duration_seconds: u64,
    pub peers: Vec<PeerStats>,
}

/// One line of the active rooms dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub visit_id: String,
    pub peer_count: usize,
    pub created_at: u64,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManagerCounts {
    pub active_rooms: usize,
    pub connected_peers: usize,
}

impl PeerStats {
    fn from_peer(peer: &Peer, now: u64) -> Self {
        Self {
            id: peer.id,
            user_id: peer.user_id.clone(),
            role: peer.role,
            joined_at: peer.joined_at,
            duration_seconds: elapsed_seconds(peer.joined_at, now),
        }
    }
}

impl RoomStats {
    fn from_room(room: &Room, now: u64) -> Self {
        Self {
            room_id: room.id,
            visit_id: room.visit_id.clone(),
            peer_count: room.peer_count(),
            is_active: room.is_active,
            created_at: room.created_at,
            duration_seconds: elapsed_seconds(room.created_at, now),
            peers: room
                .peers
                .iter()
                .map(|peer| PeerStats::from_peer(peer, now))
                .collect(),
        }
    }
}

impl RoomSummary {
    fn from_room(room: &Room, now: u64) -> Self {
        Self {
            room_id: room.id,
            visit_id: room.visit_id.clone(),
            peer_count: room.peer_count(),
            created_at: room.created_at,
            duration_seconds: elapsed_seconds(room.created_at, now),
        }
    }
}

impl RoomManager {
    pub fn get_room_stats(&self, room_id: &RoomId) -> Option<RoomStats> {
        let now = now_millis();
        self.registry
            .read()
            .room(room_id)
            .map(|room| RoomStats::from_room(room, now))
    }

    /// Summaries of all active rooms, oldest first.
    pub fn get_active_rooms(&self) -> Vec<RoomSummary> {
        let now = now_millis();
        let mut rooms: Vec<RoomSummary> = self
            .registry
            .read()
            .rooms()
            .map(|room| RoomSummary::from_room(room, now))
            .collect();
        rooms.sort_by_key(|room| room.created_at);
        rooms
    }

    pub fn counts(&self) -> ManagerCounts {
        let registry = self.registry.read();
        ManagerCounts {
            active_rooms: registry.room_count(),
            connected_peers: registry.connection_count(),
        }
    }
}
