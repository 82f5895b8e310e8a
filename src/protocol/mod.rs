//! Wire protocol

mod messages;
mod payload;

pub use messages::{ClientMessage, PeerInfo, ServerMessage};
pub use payload::{IceCandidate, SdpType, SessionDescription};
