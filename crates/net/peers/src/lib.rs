//! Direct peer connections with Arc-per-connection pattern for minimal lock contention.

pub mod state;
pub mod table;

pub use state::{ConnectionState, PeerConnection};
pub use table::PeerConnectionTable;
