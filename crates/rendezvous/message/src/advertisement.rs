//! Peer and route advertisements carried by control messages.
//!
//! The document encoding here is the in-tree default (postcard). Deployments
//! with their own advertisement format supply documents through the
//! `AdvertisementSource` capability instead.

use bytes::Bytes;
use rendezvous_primitives::{EndpointAddress, PeerIdentity};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum AdvertisementError {
    #[error("malformed advertisement document: {0}")]
    Malformed(#[from] postcard::Error),
}

/// How to reach a peer: its identity plus the endpoint addresses it listens on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAdvertisement {
    pub destination: PeerIdentity,
    pub endpoints: Vec<EndpointAddress>,
}

impl RouteAdvertisement {
    pub fn new(destination: PeerIdentity, endpoints: Vec<EndpointAddress>) -> Self {
        Self {
            destination,
            endpoints,
        }
    }
}

/// Self-description a peer publishes: identity, display name and route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAdvertisement {
    pub peer: PeerIdentity,
    pub name: String,
    pub route: Option<RouteAdvertisement>,
}

impl PeerAdvertisement {
    pub fn new(peer: PeerIdentity, name: impl Into<String>) -> Self {
        Self {
            peer,
            name: name.into(),
            route: None,
        }
    }

    pub fn with_route(mut self, route: RouteAdvertisement) -> Self {
        self.route = Some(route);
        self
    }

    /// Route hint embedded in the advertisement, if any.
    pub fn route(&self) -> Option<&RouteAdvertisement> {
        self.route.as_ref()
    }

    pub fn to_document(&self) -> Result<Bytes, AdvertisementError> {
        Ok(postcard::to_allocvec(self)?.into())
    }

    pub fn from_document(document: &[u8]) -> Result<Self, AdvertisementError> {
        Ok(postcard::from_bytes(document)?)
    }
}
