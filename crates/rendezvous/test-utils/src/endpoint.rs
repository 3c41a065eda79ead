//! In-memory endpoint service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rendezvous_api::{Channel, Endpoint};
use rendezvous_message::RouteAdvertisement;
use rendezvous_primitives::{EndpointAddress, PeerIdentity};

/// A channel request seen by [`MemoryEndpoint`].
#[derive(Debug, Clone)]
pub struct ChannelRequest {
    pub address: EndpointAddress,
    pub route: Option<RouteAdvertisement>,
}

/// Endpoint that hands out pre-registered channels, keyed by peer.
///
/// Addresses naming a peer without a registered channel yield `None`, as an
/// unreachable peer would. Every request is recorded.
#[derive(Debug, Default)]
pub struct MemoryEndpoint {
    channels: Mutex<HashMap<PeerIdentity, Arc<dyn Channel>>>,
    requests: Mutex<Vec<ChannelRequest>>,
}

impl MemoryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(self, peer: PeerIdentity, channel: Arc<dyn Channel>) -> Self {
        self.register(peer, channel);
        self
    }

    pub fn register(&self, peer: PeerIdentity, channel: Arc<dyn Channel>) {
        self.channels.lock().insert(peer, channel);
    }

    pub fn requests(&self) -> Vec<ChannelRequest> {
        self.requests.lock().clone()
    }

    /// Requests that named `peer`.
    pub fn requests_for(&self, peer: &PeerIdentity) -> Vec<ChannelRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| matches!(r.address.peer_identity(), Ok(Some(p)) if &p == peer))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Endpoint for MemoryEndpoint {
    async fn open_channel(
        &self,
        address: &EndpointAddress,
        route: Option<&RouteAdvertisement>,
    ) -> Option<Arc<dyn Channel>> {
        self.requests.lock().push(ChannelRequest {
            address: address.clone(),
            route: route.cloned(),
        });

        let peer = address.peer_identity().ok().flatten()?;
        self.channels.lock().get(&peer).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingChannel;

    #[tokio::test]
    async fn test_open_registered_channel() {
        let peer = PeerIdentity::random();
        let endpoint = MemoryEndpoint::new().with_channel(peer.clone(), RecordingChannel::for_peer(&peer));

        let address = EndpointAddress::for_peer(&peer, None);
        assert!(endpoint.open_channel(&address, None).await.is_some());

        let stranger = EndpointAddress::for_peer(&PeerIdentity::random(), None);
        assert!(endpoint.open_channel(&stranger, None).await.is_none());

        let raw = EndpointAddress::new("tcp", "10.0.0.1:9701");
        assert!(endpoint.open_channel(&raw, None).await.is_none());

        assert_eq!(endpoint.requests().len(), 3);
        assert_eq!(endpoint.requests_for(&peer).len(), 1);
    }
}
