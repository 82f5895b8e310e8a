//! Room and peer model types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Current wall-clock time in Unix epoch milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Whole seconds elapsed between `since` and `now` (both epoch ms), never negative.
pub(crate) fn elapsed_seconds(since: u64, now: u64) -> u64 {
    now.saturating_sub(since) / 1000
}

/// Generated room identifier.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Generated peer identifier, unique across rooms.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub Uuid);

impl PeerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque transport connection identifier.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random connection id for a newly accepted socket.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Participant role within a visit.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Doctor,
    Patient,
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantRole::Doctor => f.write_str("doctor"),
            ParticipantRole::Patient => f.write_str("patient"),
        }
    }
}

/// A participant's connection within a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Peer {
    pub id: PeerId,
    pub connection_id: ConnectionId,
    pub user_id: String,
    pub role: ParticipantRole,
    /// Epoch milliseconds.
    pub joined_at: u64,
}

impl Peer {
    pub(crate) fn new(connection_id: ConnectionId, user_id: String, role: ParticipantRole) -> Self {
        Self {
            id: PeerId::new(),
            connection_id,
            user_id,
            role,
            joined_at: now_millis(),
        }
    }
}

/// Signaling session container for one visit.
///
/// Values handed out by [`RoomManager`](crate::room::RoomManager) are snapshots;
/// mutating them has no effect on the manager's state.
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub visit_id: String,
    /// Epoch milliseconds.
    pub created_at: u64,
    pub is_active: bool,
    /// Peers in join order.
    pub peers: Vec<Peer>,
}

impl Room {
    pub(crate) fn new(visit_id: String) -> Self {
        Self {
            id: RoomId::new(),
            visit_id,
            created_at: now_millis(),
            is_active: true,
            peers: Vec::new(),
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn peer(&self, peer_id: &PeerId) -> Option<&Peer> {
        self.peers.iter().find(|p| &p.id == peer_id)
    }

    pub(crate) fn remove_peer(&mut self, peer_id: &PeerId) -> Option<Peer> {
        let pos = self.peers.iter().position(|p| &p.id == peer_id)?;
        Some(self.peers.remove(pos))
    }
}

/// Where a connection currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerLocation {
    pub peer: Peer,
    pub room_id: RoomId,
}
