//! Connection handlers

use crate::protocol::ServerMessage;
use crate::room::ConnectionId;
use crate::state::{AppState, Session};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// Register a new connection
pub fn handle_connection(
    state: &Arc<AppState>,
    sender: UnboundedSender<ServerMessage>,
) -> ConnectionId {
    let connection_id = ConnectionId::generate();

    let session = Session {
        id: connection_id.clone(),
        sender: sender.clone(),
        connected_at: Instant::now(),
    };
    state.sessions.insert(connection_id.clone(), session);

    let _ = sender.send(ServerMessage::Connected {
        connection_id: connection_id.clone(),
    });

    tracing::info!(connection_id = %connection_id, "New connection established");
    connection_id
}

/// Tear down a connection, leaving its room if any
pub fn handle_disconnect(state: &Arc<AppState>, connection_id: &ConnectionId) {
    let session = state.sessions.remove(connection_id);
    crate::handlers::room::leave_room_internal(state, connection_id);

    match session {
        Some((_, session)) => tracing::info!(
            connection_id = %connection_id,
            connected_secs = session.connected_at.elapsed().as_secs(),
            "Connection closed"
        ),
        None => tracing::debug!(connection_id = %connection_id, "Disconnect for unknown connection"),
    }
}

pub fn handle_heartbeat(sender: &UnboundedSender<ServerMessage>) {
    let _ = sender.send(ServerMessage::HeartbeatAck);
}
