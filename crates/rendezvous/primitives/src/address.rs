//! Endpoint and service addressing.
//!
//! An [`EndpointAddress`] is `protocol://address[/service[/param]]`. When the
//! protocol is [`PEER_PROTOCOL`] the address names an overlay peer and its
//! protocol address is the peer identity's unique value. Every other protocol
//! (`tcp`, `udp`, `mcast`, ...) is a raw network address.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identity::{IdentityError, PeerIdentity};

/// Protocol name of addresses that name an overlay peer.
pub const PEER_PROTOCOL: &str = "overlay";

/// Error parsing an [`EndpointAddress`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("endpoint address is missing `://`: {0}")]
    MissingSeparator(String),
    #[error("endpoint address has an empty protocol: {0}")]
    EmptyProtocol(String),
}

/// Destination service of a message: a service name plus an optional param.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceAddress {
    pub name: String,
    pub param: Option<String>,
}

impl ServiceAddress {
    pub fn new(name: impl Into<String>, param: Option<String>) -> Self {
        Self {
            name: name.into(),
            param,
        }
    }

    pub fn with_param(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self::new(name, Some(param.into()))
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(param) => write!(f, "{}/{}", self.name, param),
            None => f.write_str(&self.name),
        }
    }
}

/// Transport-level address of an endpoint, optionally carrying a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointAddress {
    protocol: String,
    address: String,
    service: Option<ServiceAddress>,
}

impl EndpointAddress {
    pub fn new(protocol: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            address: address.into(),
            service: None,
        }
    }

    /// Address of an overlay peer, optionally targeting one of its services.
    pub fn for_peer(peer: &PeerIdentity, service: Option<ServiceAddress>) -> Self {
        Self {
            protocol: PEER_PROTOCOL.to_owned(),
            address: peer.unique_value().to_owned(),
            service,
        }
    }

    pub fn with_service(mut self, service: ServiceAddress) -> Self {
        self.service = Some(service);
        self
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn service(&self) -> Option<&ServiceAddress> {
        self.service.as_ref()
    }

    /// Whether this address names an overlay peer rather than a raw network endpoint.
    pub fn is_peer_address(&self) -> bool {
        self.protocol.eq_ignore_ascii_case(PEER_PROTOCOL)
    }

    /// Resolve the peer named by this address.
    ///
    /// Returns `Ok(None)` for raw network addresses and an error when a peer
    /// address carries an invalid identity.
    pub fn peer_identity(&self) -> Result<Option<PeerIdentity>, IdentityError> {
        if !self.is_peer_address() {
            return Ok(None);
        }
        PeerIdentity::from_unique_value(&self.address).map(Some)
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.address)?;
        if let Some(service) = &self.service {
            write!(f, "/{service}")?;
        }
        Ok(())
    }
}

impl FromStr for EndpointAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (protocol, rest) = s
            .split_once("://")
            .ok_or_else(|| AddressError::MissingSeparator(s.to_owned()))?;
        if protocol.is_empty() {
            return Err(AddressError::EmptyProtocol(s.to_owned()));
        }

        let mut parts = rest.splitn(3, '/');
        let address = parts.next().unwrap_or_default().to_owned();
        let service = parts
            .next()
            .filter(|name| !name.is_empty())
            .map(|name| ServiceAddress::new(name, parts.next().map(str::to_owned)));

        Ok(Self {
            protocol: protocol.to_owned(),
            address,
            service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_address_resolves() {
        let peer = PeerIdentity::random();
        let addr = EndpointAddress::for_peer(&peer, None);
        assert!(addr.is_peer_address());
        assert_eq!(addr.peer_identity(), Ok(Some(peer)));
    }

    #[test]
    fn test_network_address_has_no_peer() {
        let addr: EndpointAddress = "tcp://10.0.0.1:9701".parse().unwrap();
        assert!(!addr.is_peer_address());
        assert_eq!(addr.peer_identity(), Ok(None));
    }

    #[test]
    fn test_malformed_peer_address() {
        let addr = EndpointAddress::new(PEER_PROTOCOL, "not-hex!");
        assert!(matches!(addr.peer_identity(), Err(IdentityError::NotHex(_))));
    }

    #[test]
    fn test_parse_with_service() {
        let addr: EndpointAddress = "overlay://abcd/rdv-prop/group1".parse().unwrap();
        assert_eq!(addr.protocol(), "overlay");
        assert_eq!(addr.address(), "abcd");
        assert_eq!(
            addr.service(),
            Some(&ServiceAddress::with_param("rdv-prop", "group1"))
        );
        assert_eq!(addr.to_string(), "overlay://abcd/rdv-prop/group1");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "abcd".parse::<EndpointAddress>(),
            Err(AddressError::MissingSeparator("abcd".into()))
        );
        assert_eq!(
            "://abcd".parse::<EndpointAddress>(),
            Err(AddressError::EmptyProtocol("://abcd".into()))
        );
    }
}
