//! Capabilities the rendezvous propagation core consumes from its
//! collaborators.
//!
//! The core never talks to a transport, a membership protocol or an
//! application directly. It is handed implementations of these traits:
//!
//! - [`Endpoint`] / [`Channel`]: address resolution and per-destination sends
//! - [`NeighborBroadcast`]: network-level flood to adjacent peers
//! - [`PeerViewLookup`]: rendezvous peer-view membership (server role only)
//! - [`LocalDelivery`]: hand-off to local services
//! - [`AdvertisementSource`]: the local peer advertisement document

mod endpoint;
mod error;
mod services;

pub use endpoint::{Channel, Endpoint, NeighborBroadcast};
pub use error::{ChannelError, DeliveryError, NetworkError};
pub use services::{
    AdvertisementSource, LocalDelivery, NoPeerView, PeerViewEntry, PeerViewLookup,
    StaticAdvertisement,
};
