//! Transport capabilities: channels to a single endpoint and the endpoint
//! service that opens them.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use auto_impl::auto_impl;
use rendezvous_message::{Message, RouteAdvertisement};
use rendezvous_primitives::{EndpointAddress, IdentityError, PeerIdentity, ServiceAddress};

use crate::error::{ChannelError, NetworkError};

/// An open, possibly shared, outbound channel to one endpoint.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait Channel: Send + Sync + Debug {
    /// Address this channel delivers to.
    fn destination(&self) -> &EndpointAddress;

    /// Best-effort send. May fail fast when the channel is saturated.
    async fn send(&self, message: Message, service: &ServiceAddress) -> Result<(), ChannelError>;

    /// Send that waits for queue capacity instead of failing fast.
    async fn send_reliable(
        &self,
        message: Message,
        service: &ServiceAddress,
    ) -> Result<(), ChannelError> {
        self.send(message, service).await
    }

    fn is_closed(&self) -> bool {
        false
    }
}

/// Endpoint service: resolves addresses and opens channels.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait Endpoint: Send + Sync {
    /// Resolve the overlay peer named by a transport address.
    ///
    /// `Ok(None)` means the address is a raw network address rather than a
    /// peer address.
    fn resolve_peer(&self, address: &EndpointAddress) -> Result<Option<PeerIdentity>, IdentityError> {
        address.peer_identity()
    }

    /// Acquire a channel to `address`, using `route` as a hint when given.
    ///
    /// Returns `None` when no channel can be obtained without blocking.
    async fn open_channel(
        &self,
        address: &EndpointAddress,
        route: Option<&RouteAdvertisement>,
    ) -> Option<Arc<dyn Channel>>;
}

/// Network-level broadcast to directly adjacent peers (subnet multicast,
/// relay broadcast, ...). A single operation with no partial success.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait NeighborBroadcast: Send + Sync {
    async fn broadcast(&self, message: Message, service: &ServiceAddress) -> Result<(), NetworkError>;
}
