#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use telehealth_signaling::config::Config;
use telehealth_signaling::handlers;
use telehealth_signaling::protocol::ServerMessage;
use telehealth_signaling::room::ConnectionId;
use telehealth_signaling::state::AppState;
use tokio::sync::mpsc;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_state() -> Arc<AppState> {
    init_tracing();
    Arc::new(AppState::new(Config::default()))
}

/// In-memory stand-in for a WebSocket client.
pub struct TestClient {
    pub id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerMessage>,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl TestClient {
    /// Registers the connection and consumes the `Connected` greeting.
    pub fn connect(state: &Arc<AppState>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = handlers::handle_connection(state, tx.clone());
        let mut client = Self { id, tx, rx };

        match client.recv() {
            Some(ServerMessage::Connected { connection_id }) => {
                assert_eq!(connection_id, client.id)
            }
            other => panic!("expected Connected, got {other:?}"),
        }
        client
    }

    pub fn send(&self, state: &Arc<AppState>, frame: Value) {
        self.send_raw(state, &frame.to_string());
    }

    pub fn send_raw(&self, state: &Arc<AppState>, text: &str) {
        handlers::handle_text_frame(state, &self.id, &self.tx, text);
    }

    pub fn join(&mut self, state: &Arc<AppState>, visit_id: &str, user_id: &str, role: &str) {
        self.send(
            state,
            serde_json::json!({
                "type": "JoinRoom",
                "payload": {"visit_id": visit_id, "user_id": user_id, "role": role}
            }),
        );
    }

    pub fn recv(&mut self) -> Option<ServerMessage> {
        self.rx.try_recv().ok()
    }

    pub fn expect(&mut self) -> ServerMessage {
        self.recv().expect("expected a pending server message")
    }

    pub fn expect_error(&mut self, code: &str) {
        match self.expect() {
            ServerMessage::Error { code: got, .. } => assert_eq!(got, code),
            other => panic!("expected error {code}, got {other:?}"),
        }
    }

    pub fn assert_idle(&mut self) {
        if let Some(msg) = self.recv() {
            panic!("unexpected message: {msg:?}");
        }
    }

    pub fn disconnect(self, state: &Arc<AppState>) {
        handlers::handle_disconnect(state, &self.id);
    }
}
