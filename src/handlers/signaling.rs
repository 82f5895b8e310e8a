//! WebRTC signaling handlers

use crate::error::SignalingError;
use crate::protocol::{IceCandidate, ServerMessage, SessionDescription};
use crate::room::ConnectionId;
use crate::state::AppState;
use std::sync::Arc;

pub fn handle_offer(
    state: &Arc<AppState>,
    from: &ConnectionId,
    to: &ConnectionId,
    signal: SessionDescription,
) -> Result<(), SignalingError> {
    if !state.rooms.handle_offer(from, to, &signal) {
        return Err(SignalingError::PeerUnavailable(to.to_string()));
    }
    deliver(
        state,
        to,
        ServerMessage::Offer {
            from: from.clone(),
            signal,
        },
    )?;

    tracing::debug!(from = %from, to = %to, "Relayed offer");
    Ok(())
}

pub fn handle_answer(
    state: &Arc<AppState>,
    from: &ConnectionId,
    to: &ConnectionId,
    signal: SessionDescription,
) -> Result<(), SignalingError> {
    if !state.rooms.handle_answer(from, to, &signal) {
        return Err(SignalingError::PeerUnavailable(to.to_string()));
    }
    deliver(
        state,
        to,
        ServerMessage::Answer {
            from: from.clone(),
            signal,
        },
    )?;

    tracing::debug!(from = %from, to = %to, "Relayed answer");
    Ok(())
}

pub fn handle_ice_candidate(
    state: &Arc<AppState>,
    from: &ConnectionId,
    to: &ConnectionId,
    signal: IceCandidate,
) -> Result<(), SignalingError> {
    if !state.rooms.handle_ice_candidate(from, to, &signal) {
        return Err(SignalingError::PeerUnavailable(to.to_string()));
    }
    deliver(
        state,
        to,
        ServerMessage::IceCandidate {
            from: from.clone(),
            signal,
        },
    )?;

    tracing::debug!(from = %from, to = %to, "Relayed ICE candidate");
    Ok(())
}

/// Push to the recipient's socket; a dropped socket counts as unavailable
fn deliver(
    state: &AppState,
    to: &ConnectionId,
    message: ServerMessage,
) -> Result<(), SignalingError> {
    if state.send_to(to, message) {
        Ok(())
    } else {
        tracing::warn!(to = %to, "Relay allowed but recipient has no live session");
        Err(SignalingError::PeerUnavailable(to.to_string()))
    }
}
