//! Signaling errors reported back to the client

use crate::protocol::ServerMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("Connection has not joined a room")]
    NotInRoom,

    #[error("Connection is already in a room")]
    AlreadyInRoom,

    #[error("Visit id must not be empty")]
    InvalidVisit,

    #[error("No room available for visit {0}")]
    RoomUnavailable(String),

    /// Unknown, offline, or in another room. Deliberately not distinguished.
    #[error("Participant {0} is not reachable")]
    PeerUnavailable(String),

    #[error("Message of {size} bytes exceeds limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] serde_json::Error),
}

impl SignalingError {
    pub fn code(&self) -> &'static str {
        match self {
            SignalingError::NotInRoom => "not_in_room",
            SignalingError::AlreadyInRoom => "already_in_room",
            SignalingError::InvalidVisit => "invalid_visit",
            SignalingError::RoomUnavailable(_) => "room_unavailable",
            SignalingError::PeerUnavailable(_) => "peer_unavailable",
            SignalingError::MessageTooLarge { .. } => "message_too_large",
            SignalingError::InvalidMessage(_) => "invalid_message",
        }
    }
}

impl From<&SignalingError> for ServerMessage {
    fn from(err: &SignalingError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_to_server_message() {
        let err = SignalingError::MessageTooLarge {
            size: 70_000,
            limit: 65_536,
        };
        match ServerMessage::from(&err) {
            ServerMessage::Error { code, message } => {
                assert_eq!(code, "message_too_large");
                assert!(message.contains("70000"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_message_from_serde() {
        let err: SignalingError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "invalid_message");
    }
}
