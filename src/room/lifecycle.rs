//! Idle room reclamation

use super::manager::RoomManager;
use super::model::{now_millis, RoomId};
use super::registry::ReclaimIdleRoom;
use tracing::info;

impl RoomManager {
    /// Close empty rooms older than `max_idle_minutes`.
    ///
    /// Candidates are collected under the read lock; each one is then
    /// re-checked and closed under its own short write lock, so a peer that
    /// joins in between keeps the room alive. Rooms with peers are never
    /// closed. Returns the number of rooms closed.
    pub fn cleanup_inactive_rooms(&self, max_idle_minutes: u64) -> usize {
        let max_idle_ms = max_idle_minutes.saturating_mul(60_000);
        let created_before = now_millis().saturating_sub(max_idle_ms);

        let candidates: Vec<RoomId> = self
            .registry
            .read()
            .rooms()
            .filter(|room| room.is_empty() && room.created_at < created_before)
            .map(|room| room.id)
            .collect();

        let mut closed = 0;
        for room_id in candidates {
            let reclaimed = self.registry.write().apply(ReclaimIdleRoom {
                room_id,
                created_before,
            });
            if reclaimed {
                info!(room_id = %room_id, max_idle_minutes, "Reclaimed idle room");
                closed += 1;
            }
        }

        if closed > 0 {
            info!(closed_rooms = closed, "Idle room cleanup completed");
        }
        closed
    }
}
