//! In-process transport: every send becomes an [`Envelope`] on one shared queue.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rendezvous_api::{
    Channel, ChannelError, DeliveryError, Endpoint, LocalDelivery, NeighborBroadcast, NetworkError,
};
use rendezvous_message::{Message, RouteAdvertisement};
use rendezvous_primitives::{EndpointAddress, PeerIdentity, ServiceAddress};
use tokio::sync::mpsc;

/// A message in flight between two simulated nodes.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) to: usize,
    pub(crate) from: PeerIdentity,
    pub(crate) message: Message,
}

pub(crate) type Queue = mpsc::UnboundedSender<Envelope>;

/// Channel from one node to another.
#[derive(Debug)]
pub(crate) struct OverlayChannel {
    destination: EndpointAddress,
    to: usize,
    from: PeerIdentity,
    queue: Queue,
}

impl OverlayChannel {
    pub(crate) fn new(from: PeerIdentity, to: usize, to_peer: &PeerIdentity, queue: Queue) -> Self {
        Self {
            destination: EndpointAddress::for_peer(to_peer, None),
            to,
            from,
            queue,
        }
    }
}

#[async_trait]
impl Channel for OverlayChannel {
    fn destination(&self) -> &EndpointAddress {
        &self.destination
    }

    async fn send(&self, message: Message, _service: &ServiceAddress) -> Result<(), ChannelError> {
        self.queue
            .send(Envelope {
                to: self.to,
                from: self.from.clone(),
                message,
            })
            .map_err(|_| ChannelError::Closed(self.destination.clone()))
    }

    fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

/// Opens channels to any node of the overlay by peer address.
pub(crate) struct OverlayEndpoint {
    local: PeerIdentity,
    index: Arc<HashMap<PeerIdentity, usize>>,
    queue: Queue,
}

impl OverlayEndpoint {
    pub(crate) fn new(local: PeerIdentity, index: Arc<HashMap<PeerIdentity, usize>>, queue: Queue) -> Self {
        Self { local, index, queue }
    }
}

#[async_trait]
impl Endpoint for OverlayEndpoint {
    async fn open_channel(
        &self,
        address: &EndpointAddress,
        _route: Option<&RouteAdvertisement>,
    ) -> Option<Arc<dyn Channel>> {
        let peer = address.peer_identity().ok().flatten()?;
        let to = *self.index.get(&peer)?;
        Some(Arc::new(OverlayChannel::new(self.local.clone(), to, &peer, self.queue.clone())))
    }
}

/// Broadcast to the adjacent nodes of one node.
pub(crate) struct OverlayBroadcast {
    neighbors: Vec<OverlayChannel>,
}

impl OverlayBroadcast {
    pub(crate) fn new(neighbors: Vec<OverlayChannel>) -> Self {
        Self { neighbors }
    }
}

#[async_trait]
impl NeighborBroadcast for OverlayBroadcast {
    async fn broadcast(&self, message: Message, service: &ServiceAddress) -> Result<(), NetworkError> {
        for channel in &self.neighbors {
            channel
                .send(message.clone(), service)
                .await
                .map_err(|_| NetworkError::Unavailable)?;
        }
        Ok(())
    }
}

/// Counts messages handed to local services.
#[derive(Debug, Default)]
pub(crate) struct CountingDelivery {
    delivered: AtomicUsize,
}

impl CountingDelivery {
    pub(crate) fn count(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LocalDelivery for CountingDelivery {
    async fn deliver(&self, _message: Message, _service: &ServiceAddress) -> Result<(), DeliveryError> {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
