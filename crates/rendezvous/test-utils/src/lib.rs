//! In-memory collaborators for testing the rendezvous propagation core.
//!
//! - [`MemoryEndpoint`]: hands out pre-registered channels and records requests
//! - [`RecordingChannel`], [`FailingChannel`], [`StallingChannel`]
//! - [`RecordingBroadcast`], [`StaticPeerView`], [`RecordingDelivery`]

mod channel;
mod endpoint;
mod services;

pub use channel::{FailingChannel, RecordingChannel, SentMessage, StallingChannel};
pub use endpoint::{ChannelRequest, MemoryEndpoint};
pub use services::{RecordingBroadcast, RecordingDelivery, StaticPeerView};

use rendezvous_primitives::{EndpointAddress, PeerIdentity};

/// Source address of a message sent by `peer`.
pub fn peer_address(peer: &PeerIdentity) -> EndpointAddress {
    EndpointAddress::for_peer(peer, None)
}

/// A raw network source address (not naming any peer).
pub fn network_address() -> EndpointAddress {
    EndpointAddress::new("tcp", "192.168.1.20:9701")
}

/// Generate `n` random peer identities.
pub fn random_peers(n: usize) -> Vec<PeerIdentity> {
    (0..n).map(|_| PeerIdentity::random()).collect()
}
