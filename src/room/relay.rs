//! Relay decisions for offer/answer/ICE messages
//!
//! These only decide whether a payload may be forwarded; delivery is left to
//! the transport layer.

use super::manager::RoomManager;
use super::model::ConnectionId;
use super::registry::Resolution;
use crate::protocol::{IceCandidate, SessionDescription};
use tracing::debug;

impl RoomManager {
    /// True iff both connections belong to peers of the same active room.
    ///
    /// Unknown connections and peers in different rooms are not distinguished.
    pub fn can_relay(&self, from: &ConnectionId, to: &ConnectionId) -> bool {
        if from == to {
            return false;
        }

        let (sender, recipient) = {
            let registry = self.registry.read();
            (registry.resolve(from), registry.resolve(to))
        };

        match (sender, recipient) {
            (Resolution::Found(a), Resolution::Found(b)) => a.room_id == b.room_id,
            (sender, recipient) => {
                if matches!(sender, Resolution::Dangling) {
                    self.heal(from);
                }
                if matches!(recipient, Resolution::Dangling) {
                    self.heal(to);
                }
                false
            }
        }
    }

    pub fn handle_offer(
        &self,
        from: &ConnectionId,
        to: &ConnectionId,
        _offer: &SessionDescription,
    ) -> bool {
        let allowed = self.can_relay(from, to);
        debug!(from = %from, to = %to, allowed, "Offer relay decision");
        allowed
    }

    pub fn handle_answer(
        &self,
        from: &ConnectionId,
        to: &ConnectionId,
        _answer: &SessionDescription,
    ) -> bool {
        let allowed = self.can_relay(from, to);
        debug!(from = %from, to = %to, allowed, "Answer relay decision");
        allowed
    }

    pub fn handle_ice_candidate(
        &self,
        from: &ConnectionId,
        to: &ConnectionId,
        _candidate: &IceCandidate,
    ) -> bool {
        let allowed = self.can_relay(from, to);
        debug!(from = %from, to = %to, allowed, "ICE candidate relay decision");
        allowed
    }
}
