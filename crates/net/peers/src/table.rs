//! Peer connection table with Arc-per-connection pattern for minimal lock contention.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rendezvous_api::Channel;
use rendezvous_primitives::PeerIdentity;
use tracing::debug;

use crate::state::{ConnectionState, PeerConnection};

type ConnectionMap = HashMap<PeerIdentity, Arc<PeerConnection>>;

/// Set of direct peer connections, keyed by peer identity.
///
/// Readers take a [`snapshot`](Self::snapshot) of `Arc<PeerConnection>`
/// handles and iterate it without holding the lock, so a fan-out pass never
/// observes the map changing mid-iteration. A connection that goes down after
/// the snapshot was taken simply fails its send.
///
/// Only the connection-management layer calls the mutating methods.
#[derive(Debug, Default)]
pub struct PeerConnectionTable {
    /// Brief lock to get Arc, then release.
    connections: RwLock<ConnectionMap>,
}

impl PeerConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, peer: &PeerIdentity) -> Option<Arc<PeerConnection>> {
        self.connections.read().get(peer).map(Arc::clone)
    }

    /// Point-in-time copy of every connection handle.
    pub fn snapshot(&self) -> Vec<Arc<PeerConnection>> {
        self.connections.read().values().map(Arc::clone).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_live_connection(&self) -> bool {
        self.connections.read().values().any(|c| c.is_connected())
    }

    /// Record a successful connect handshake.
    ///
    /// An existing entry for `peer` gets the new channel and is flagged
    /// connected again; the returned handle is the one stored in the table.
    pub fn connect(&self, peer: PeerIdentity, channel: Arc<dyn Channel>) -> Arc<PeerConnection> {
        let connection = {
            let mut connections = self.connections.write();
            match connections.get(&peer) {
                Some(existing) => {
                    existing.replace_channel(channel);
                    existing.set_connection_state(ConnectionState::Connected);
                    existing.touch();
                    Arc::clone(existing)
                }
                None => {
                    let connection = Arc::new(PeerConnection::new(peer.clone(), channel));
                    connections.insert(peer.clone(), Arc::clone(&connection));
                    connection
                }
            }
        };

        debug!(%peer, "peer connected");
        connection
    }

    /// Flag a connection as down. Returns `false` if the peer is unknown or
    /// was already down.
    pub fn mark_disconnected(&self, peer: &PeerIdentity) -> bool {
        let Some(connection) = self.lookup(peer) else {
            return false;
        };
        if !connection.is_connected() {
            return false;
        }

        connection.set_connection_state(ConnectionState::Disconnected);
        debug!(%peer, "peer disconnected");
        true
    }

    /// Drop `peer` from the table.
    ///
    /// The removed connection is flagged down first, so handles still held in
    /// an older snapshot stop sending to it.
    pub fn remove(&self, peer: &PeerIdentity) -> Option<Arc<PeerConnection>> {
        let removed = self.connections.write().remove(peer)?;
        removed.set_connection_state(ConnectionState::Disconnected);
        debug!(%peer, "peer removed from connection table");
        Some(removed)
    }

}
