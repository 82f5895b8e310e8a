//! Room membership handlers

use crate::error::SignalingError;
use crate::protocol::{PeerInfo, ServerMessage};
use crate::room::{ConnectionId, ParticipantRole, Peer, RoomId};
use crate::state::AppState;
use std::sync::Arc;

/// Join the visit's room, creating it on first join
pub fn handle_join_room(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    visit_id: &str,
    user_id: &str,
    role: ParticipantRole,
) -> Result<(), SignalingError> {
    let visit_id = visit_id.trim();
    if visit_id.is_empty() {
        return Err(SignalingError::InvalidVisit);
    }

    if state.rooms.get_peer_by_connection_id(connection_id).is_some() {
        return Err(SignalingError::AlreadyInRoom);
    }

    let (room_id, peer) = join_visit(state, connection_id, visit_id, user_id, role)?;

    let other_peers: Vec<Peer> = state
        .rooms
        .get_peers_in_room(&room_id)
        .into_iter()
        .filter(|p| p.id != peer.id)
        .collect();

    state.send_to(
        connection_id,
        ServerMessage::JoinedRoom {
            room_id,
            peer_id: peer.id,
            other_peers: other_peers.iter().map(PeerInfo::from).collect(),
        },
    );

    let announcement = ServerMessage::PeerJoined {
        room_id,
        peer: PeerInfo::from(&peer),
    };
    for other in &other_peers {
        state.send_to(&other.connection_id, announcement.clone());
    }

    tracing::info!(
        connection_id = %connection_id,
        room_id = %room_id,
        visit_id = %visit_id,
        user_count = other_peers.len() + 1,
        "User joined room"
    );
    Ok(())
}

/// Resolve the visit's room and add the peer.
///
/// The idle sweep may reclaim a just-created empty room before the peer is
/// added; in that case a fresh room is requested once more.
fn join_visit(
    state: &AppState,
    connection_id: &ConnectionId,
    visit_id: &str,
    user_id: &str,
    role: ParticipantRole,
) -> Result<(RoomId, Peer), SignalingError> {
    join_visit_with(state, connection_id, visit_id, user_id, role, |_| {})
}

/// `before_add` runs between resolving the room and adding the peer.
fn join_visit_with(
    state: &AppState,
    connection_id: &ConnectionId,
    visit_id: &str,
    user_id: &str,
    role: ParticipantRole,
    mut before_add: impl FnMut(&RoomId),
) -> Result<(RoomId, Peer), SignalingError> {
    for _ in 0..2 {
        let room_id = state.rooms.get_or_create_room_for_visit(visit_id);
        before_add(&room_id);
        if let Some(peer) = state.rooms.add_peer(&room_id, connection_id, user_id, role) {
            return Ok((room_id, peer));
        }
        if state.rooms.get_peer_by_connection_id(connection_id).is_some() {
            return Err(SignalingError::AlreadyInRoom);
        }
        tracing::warn!(room_id = %room_id, visit_id = %visit_id, "Room vanished before join, retrying");
    }
    Err(SignalingError::RoomUnavailable(visit_id.to_string()))
}

/// Remove the connection from its room and tell the remaining peers.
///
/// Returns `false` if the connection was not in a room.
pub fn leave_room_internal(state: &AppState, connection_id: &ConnectionId) -> bool {
    let Some(location) = state.rooms.remove_peer(connection_id) else {
        return false;
    };

    let remaining = state.rooms.get_peers_in_room(&location.room_id);
    let notice = ServerMessage::PeerLeft {
        room_id: location.room_id,
        connection_id: connection_id.clone(),
        peer_id: location.peer.id,
    };
    for peer in &remaining {
        state.send_to(&peer.connection_id, notice.clone());
    }

    tracing::info!(
        connection_id = %connection_id,
        room_id = %location.room_id,
        remaining = remaining.len(),
        "User left room"
    );
    true
}

pub fn handle_leave_room(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
) -> Result<(), SignalingError> {
    if leave_room_internal(state, connection_id) {
        Ok(())
    } else {
        Err(SignalingError::NotInRoom)
    }
}

/// Reclaim rooms that were created but never joined
pub fn cleanup_idle_rooms(state: &Arc<AppState>) -> usize {
    let max_idle = state.config.room.idle_timeout_minutes;
    let closed = state.rooms.cleanup_inactive_rooms(max_idle);

    if closed > 0 {
        tracing::info!(
            closed_rooms = closed,
            active_rooms = state.rooms.counts().active_rooms,
            "Cleanup completed"
        );
    }
    closed
}
