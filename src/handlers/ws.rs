//! WebSocket connection loop and message dispatch

use crate::error::SignalingError;
use crate::handlers;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::ConnectionId;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let max_message_bytes = state.config.transport.max_message_bytes;
    // Frames beyond twice the protocol limit are cut off by axum itself;
    // anything in between gets a protocol error instead of a dropped socket.
    ws.max_message_size(max_message_bytes.saturating_mul(2))
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = handlers::handle_connection(&state, tx.clone());

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to encode server message"),
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => handle_text_frame(&state, &connection_id, &tx, &text),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket receive error");
                break;
            }
            _ => {}
        }
    }

    handlers::handle_disconnect(&state, &connection_id);
    send_task.abort();
}

/// Bound, decode and dispatch one text frame; failures are reported to the sender only
pub fn handle_text_frame(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    sender: &UnboundedSender<ServerMessage>,
    text: &str,
) {
    let result = decode_frame(state, text)
        .and_then(|msg| handle_client_message(state, connection_id, sender, msg));

    if let Err(err) = result {
        tracing::debug!(
            connection_id = %connection_id,
            code = err.code(),
            error = %err,
            "Signaling request rejected"
        );
        let _ = sender.send(ServerMessage::from(&err));
    }
}

fn decode_frame(state: &AppState, text: &str) -> Result<ClientMessage, SignalingError> {
    let limit = state.config.transport.max_message_bytes;
    if text.len() > limit {
        return Err(SignalingError::MessageTooLarge {
            size: text.len(),
            limit,
        });
    }
    Ok(serde_json::from_str(text)?)
}

pub fn handle_client_message(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    sender: &UnboundedSender<ServerMessage>,
    msg: ClientMessage,
) -> Result<(), SignalingError> {
    match msg {
        ClientMessage::Heartbeat => {
            handlers::handle_heartbeat(sender);
            Ok(())
        }
        ClientMessage::JoinRoom {
            visit_id,
            user_id,
            role,
        } => handlers::handle_join_room(state, connection_id, &visit_id, &user_id, role),
        ClientMessage::LeaveRoom => handlers::handle_leave_room(state, connection_id),
        ClientMessage::Offer { to, signal } => {
            handlers::handle_offer(state, connection_id, &to, signal)
        }
        ClientMessage::Answer { to, signal } => {
            handlers::handle_answer(state, connection_id, &to, signal)
        }
        ClientMessage::IceCandidate { to, signal } => {
            handlers::handle_ice_candidate(state, connection_id, &to, signal)
        }
    }
}
