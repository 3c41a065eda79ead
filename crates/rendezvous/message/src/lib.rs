//! Messages exchanged by the rendezvous overlay.
//!
//! - [`Message`]: value type made of namespaced elements plus a propagation
//!   header slot
//! - [`PropagationHeader`]: message id, hop budget and visited-peer set
//! - [`ControlMessage`]: connect/disconnect requests and replies
//! - [`PeerAdvertisement`] / [`RouteAdvertisement`]: documents carried by
//!   control messages

mod advertisement;
mod control;
mod header;
mod message;

pub use advertisement::{AdvertisementError, PeerAdvertisement, RouteAdvertisement};
pub use control::{ControlKind, ControlMessage, RENDEZVOUS_NAMESPACE};
pub use header::{DEFAULT_MAX_TTL, PropagationHeader};
pub use message::{INDEX_NAMESPACE, Message, MessageElement};
