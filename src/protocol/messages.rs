//! Client-server message protocol

use super::payload::{IceCandidate, SessionDescription};
use crate::room::{ConnectionId, ParticipantRole, Peer, PeerId, RoomId};
use serde::{Deserialize, Serialize};

/// Client -> server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    // Connection
    Heartbeat,

    // Room Management
    JoinRoom {
        visit_id: String,
        user_id: String,
        role: ParticipantRole,
    },
    LeaveRoom,

    // WebRTC Signaling
    Offer {
        to: ConnectionId,
        signal: SessionDescription,
    },
    Answer {
        to: ConnectionId,
        signal: SessionDescription,
    },
    IceCandidate {
        to: ConnectionId,
        signal: IceCandidate,
    },
}

/// Server -> client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    // Connection
    Connected { connection_id: ConnectionId },
    HeartbeatAck,
    Error { code: String, message: String },

    // Room Events
    JoinedRoom {
        room_id: RoomId,
        peer_id: PeerId,
        other_peers: Vec<PeerInfo>,
    },
    PeerJoined {
        room_id: RoomId,
        peer: PeerInfo,
    },
    PeerLeft {
        room_id: RoomId,
        connection_id: ConnectionId,
        peer_id: PeerId,
    },

    // WebRTC Signaling
    Offer {
        from: ConnectionId,
        signal: SessionDescription,
    },
    Answer {
        from: ConnectionId,
        signal: SessionDescription,
    },
    IceCandidate {
        from: ConnectionId,
        signal: IceCandidate,
    },
}

/// Peer as seen by the other participants of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub connection_id: ConnectionId,
    pub peer_id: PeerId,
    pub user_id: String,
    pub role: ParticipantRole,
}

impl From<&Peer> for PeerInfo {
    fn from(peer: &Peer) -> Self {
        Self {
            connection_id: peer.connection_id.clone(),
            peer_id: peer.id,
            user_id: peer.user_id.clone(),
            role: peer.role,
        }
    }
}
