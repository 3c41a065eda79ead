//! Core primitive types for the rendezvous overlay.
//!
//! Kept separate from the message and propagation crates to avoid circular
//! dependencies.

mod address;
mod identity;
mod message_id;

pub use address::{AddressError, EndpointAddress, PEER_PROTOCOL, ServiceAddress};
pub use identity::{IdentityError, PEER_URN_PREFIX, PeerIdentity};
pub use message_id::MessageId;
