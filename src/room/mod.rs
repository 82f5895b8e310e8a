//! Signaling room manager
//!
//! Pairs the participants of a telehealth visit, decides whether negotiation
//! messages may be relayed between them and reclaims abandoned rooms.
//!
//! ```text
//! transport event ──▶ RoomManager ──▶ Registry::apply ──▶ rooms / visits / peer index
//!                          │
//!                          └──▶ relay decision / stats (read lock)
//! ```

mod lifecycle;
mod manager;
mod model;
mod registry;
mod relay;
mod stats;

pub use manager::RoomManager;
pub use model::{ConnectionId, ParticipantRole, Peer, PeerId, PeerLocation, Room, RoomId};
pub use stats::{ManagerCounts, PeerStats, RoomStats, RoomSummary};
