//! Propagation header attached to every flooded message.

use std::collections::BTreeSet;

use rendezvous_primitives::{MessageId, PeerIdentity, ServiceAddress};
use serde::{Deserialize, Serialize};

/// Default maximum hop budget of a flooded message.
pub const DEFAULT_MAX_TTL: u32 = 200;

/// Envelope carried by a flooded message: id, hop budget, visited peers and
/// the destination service.
///
/// The visited set only grows. The TTL can only be lowered through
/// [`cap_ttl`](Self::cap_ttl) and [`consume_hop`](Self::consume_hop).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationHeader {
    message_id: MessageId,
    ttl: u32,
    service: ServiceAddress,
    visited: BTreeSet<PeerIdentity>,
}

impl PropagationHeader {
    /// Fresh header with a new message id and an empty visited set.
    pub fn new(service: ServiceAddress, ttl: u32) -> Self {
        Self {
            message_id: MessageId::random(),
            ttl,
            service,
            visited: BTreeSet::new(),
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn service(&self) -> &ServiceAddress {
        &self.service
    }

    /// Lower the TTL to `limit` if it is currently higher. Never raises it.
    pub fn cap_ttl(&mut self, limit: u32) {
        self.ttl = self.ttl.min(limit);
    }

    /// Spend one unit of hop budget.
    pub fn consume_hop(&mut self) {
        self.ttl = self.ttl.saturating_sub(1);
    }

    pub fn is_visited(&self, peer: &PeerIdentity) -> bool {
        self.visited.contains(peer)
    }

    /// Record `peer` as having seen the message. Returns `true` if it was new.
    pub fn add_visited(&mut self, peer: PeerIdentity) -> bool {
        self.visited.insert(peer)
    }

    pub fn visited(&self) -> impl Iterator<Item = &PeerIdentity> {
        self.visited.iter()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }
}
