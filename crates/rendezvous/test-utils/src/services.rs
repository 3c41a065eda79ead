//! Recording neighbor broadcast, static peer view and recording local delivery.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use rendezvous_api::{
    DeliveryError, LocalDelivery, NeighborBroadcast, NetworkError, PeerViewEntry, PeerViewLookup,
};
use rendezvous_message::Message;
use rendezvous_primitives::{PeerIdentity, ServiceAddress};

/// Neighbor broadcast that records every message, or fails every call.
#[derive(Debug, Default)]
pub struct RecordingBroadcast {
    broadcasts: Mutex<Vec<(Message, ServiceAddress)>>,
    fail: bool,
}

impl RecordingBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcast whose transport is unavailable.
    pub fn failing() -> Self {
        Self {
            broadcasts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn count(&self) -> usize {
        self.broadcasts.lock().len()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.broadcasts.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn last_message(&self) -> Option<Message> {
        self.broadcasts.lock().last().map(|(m, _)| m.clone())
    }
}

#[async_trait]
impl NeighborBroadcast for RecordingBroadcast {
    async fn broadcast(&self, message: Message, service: &ServiceAddress) -> Result<(), NetworkError> {
        if self.fail {
            return Err(NetworkError::Unavailable);
        }
        self.broadcasts.lock().push((message, service.clone()));
        Ok(())
    }
}

/// Peer view with a fixed membership.
#[derive(Debug, Default)]
pub struct StaticPeerView {
    members: HashSet<PeerIdentity>,
}

impl StaticPeerView {
    pub fn new(members: impl IntoIterator<Item = PeerIdentity>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }
}

impl PeerViewLookup for StaticPeerView {
    fn lookup(&self, peer: &PeerIdentity) -> Option<PeerViewEntry> {
        self.members.contains(peer).then(|| PeerViewEntry {
            peer: peer.clone(),
            address: None,
        })
    }
}

/// Local delivery that records what it was handed.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    delivered: Mutex<Vec<(Message, ServiceAddress)>>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().len()
    }

    pub fn services(&self) -> Vec<ServiceAddress> {
        self.delivered.lock().iter().map(|(_, s)| s.clone()).collect()
    }
}

#[async_trait]
impl LocalDelivery for RecordingDelivery {
    async fn deliver(&self, message: Message, service: &ServiceAddress) -> Result<(), DeliveryError> {
        self.delivered.lock().push((message, service.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_broadcast() {
        let broadcast = RecordingBroadcast::failing();
        let service = ServiceAddress::new("svc", None);
        assert!(broadcast.broadcast(Message::new(), &service).await.is_err());
        assert_eq!(broadcast.count(), 0);
    }

    #[test]
    fn test_static_peer_view() {
        let member = PeerIdentity::random();
        let view = StaticPeerView::new([member.clone()]);
        assert_eq!(view.lookup(&member).map(|e| e.peer), Some(member));
        assert!(view.lookup(&PeerIdentity::random()).is_none());
    }
}
