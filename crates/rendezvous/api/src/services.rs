//! Local capabilities: peer-view membership, local delivery and the local
//! advertisement document.

use async_trait::async_trait;
use auto_impl::auto_impl;
use bytes::Bytes;
use rendezvous_message::{AdvertisementError, Message, PeerAdvertisement};
use rendezvous_primitives::{EndpointAddress, PeerIdentity, ServiceAddress};

use crate::error::DeliveryError;

/// Entry of the rendezvous peer view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerViewEntry {
    pub peer: PeerIdentity,
    pub address: Option<EndpointAddress>,
}

/// Membership lookup offered by server-role (rendezvous) nodes.
///
/// Edge-role nodes have no peer view and use [`NoPeerView`].
#[auto_impl(&, Arc, Box)]
pub trait PeerViewLookup: Send + Sync {
    fn lookup(&self, peer: &PeerIdentity) -> Option<PeerViewEntry>;
}

/// Peer view of an edge node: knows nobody.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPeerView;

impl PeerViewLookup for NoPeerView {
    fn lookup(&self, _peer: &PeerIdentity) -> Option<PeerViewEntry> {
        None
    }
}

/// Hands a received message to the local service it is addressed to.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait LocalDelivery: Send + Sync {
    async fn deliver(&self, message: Message, service: &ServiceAddress) -> Result<(), DeliveryError>;
}

/// Supplies the serialized advertisement of the local peer.
#[auto_impl(&, Arc, Box)]
pub trait AdvertisementSource: Send + Sync {
    fn local_advertisement(&self) -> Bytes;
}

/// Advertisement document fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticAdvertisement(Bytes);

impl StaticAdvertisement {
    pub fn new(document: Bytes) -> Self {
        Self(document)
    }

    pub fn from_advertisement(advertisement: &PeerAdvertisement) -> Result<Self, AdvertisementError> {
        advertisement.to_document().map(Self)
    }
}

impl AdvertisementSource for StaticAdvertisement {
    fn local_advertisement(&self) -> Bytes {
        self.0.clone()
    }
}
