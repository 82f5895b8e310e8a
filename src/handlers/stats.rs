//! Operational HTTP endpoints

use crate::room::{RoomId, RoomStats, RoomSummary};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub async fn index_handler() -> Html<&'static str> {
    Html("<h1>Telehealth Signaling Server</h1><p>WebSocket endpoint: /ws</p>")
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let counts = state.rooms.counts();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    Json(serde_json::json!({
        "status": "ok",
        "server": "telehealth-signaling",
        "timestamp": timestamp,
        "active_rooms": counts.active_rooms,
        "connected_peers": counts.connected_peers,
    }))
}

pub async fn list_rooms_handler(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummary>> {
    Json(state.rooms.get_active_rooms())
}

/// Unknown, closed and malformed ids all map to 404
pub async fn room_stats_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomStats>, StatusCode> {
    let room_id: RoomId = room_id.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    state
        .rooms
        .get_room_stats(&room_id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
