//! Application state

use crate::config::Config;
use crate::protocol::ServerMessage;
use crate::room::{ConnectionId, RoomManager};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// Shared application state
pub struct AppState {
    /// Signaling rooms and peer index
    pub rooms: RoomManager,
    /// Live connections (connection_id -> Session)
    pub sessions: DashMap<ConnectionId, Session>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            rooms: RoomManager::new(),
            sessions: DashMap::new(),
            config: Arc::new(config),
        }
    }

    /// Push a message to a live connection. Returns `false` if it is gone.
    pub fn send_to(&self, connection_id: &ConnectionId, message: ServerMessage) -> bool {
        self.sessions
            .get(connection_id)
            .is_some_and(|session| session.sender.send(message).is_ok())
    }
}

/// Outbound half of a live connection
pub struct Session {
    pub id: ConnectionId,
    pub sender: UnboundedSender<ServerMessage>,
    pub connected_at: Instant,
}
