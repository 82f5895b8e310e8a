//! Handler modules

pub mod connection;
pub mod room;
pub mod signaling;
pub mod stats;
pub mod ws;

pub use connection::*;
pub use room::*;
pub use signaling::*;
pub use stats::*;
pub use ws::*;
