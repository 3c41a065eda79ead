//! Propagation configuration.

use std::time::Duration;

use rendezvous_message::DEFAULT_MAX_TTL;
use rendezvous_primitives::ServiceAddress;
use serde::{Deserialize, Serialize};

/// TTL cap applied to messages from unrecognized peers and from the raw network.
pub const DEFAULT_UNKNOWN_PEER_TTL: u32 = 3;

/// Default bound on a single per-destination send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of per-destination sends in flight at once.
pub const DEFAULT_MAX_CONCURRENT_SENDS: usize = 16;

/// Default number of message ids remembered for duplicate detection.
pub const DEFAULT_DUPLICATE_CACHE_SIZE: usize = 4096;

/// Service flooded messages are sent to on the receiving peer.
pub const PROPAGATION_SERVICE_NAME: &str = "rdv-propagate";

/// Service control messages (connect/disconnect) are sent to.
pub const CONTROL_SERVICE_NAME: &str = "rdv";

/// Role of the local node in the overlay.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeRole {
    /// Leaf participant leasing a connection from a rendezvous.
    Edge,
    /// Flood relay for other peers.
    #[default]
    Rendezvous,
}

impl NodeRole {
    pub fn is_rendezvous(&self) -> bool {
        matches!(self, Self::Rendezvous)
    }
}

/// Configuration for the propagation service.
#[derive(Debug, Clone)]
pub struct PropagationConfig {
    /// Upper bound on the hop budget of any message.
    pub max_ttl: u32,
    /// TTL cap for messages from unrecognized senders.
    pub unknown_peer_ttl: u32,
    /// Bound on a single per-destination send.
    pub send_timeout: Duration,
    /// Per-destination sends in flight at once.
    pub max_concurrent_sends: usize,
    /// Message ids remembered for duplicate detection.
    pub duplicate_cache_size: usize,
    pub role: NodeRole,
    /// Whether counters are registered with the global `metrics` recorder.
    pub metrics_enabled: bool,
    /// Service flooded messages are addressed to on the wire.
    pub propagation_service: ServiceAddress,
    /// Service control messages are addressed to on the wire.
    pub control_service: ServiceAddress,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_ttl: DEFAULT_MAX_TTL,
            unknown_peer_ttl: DEFAULT_UNKNOWN_PEER_TTL,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            max_concurrent_sends: DEFAULT_MAX_CONCURRENT_SENDS,
            duplicate_cache_size: DEFAULT_DUPLICATE_CACHE_SIZE,
            role: NodeRole::default(),
            metrics_enabled: true,
            propagation_service: ServiceAddress::new(PROPAGATION_SERVICE_NAME, None),
            control_service: ServiceAddress::new(CONTROL_SERVICE_NAME, None),
        }
    }
}

impl PropagationConfig {
    /// Set the maximum TTL.
    pub fn with_max_ttl(mut self, max_ttl: u32) -> Self {
        self.max_ttl = max_ttl;
        self
    }

    /// Set the TTL cap for unrecognized senders.
    pub fn with_unknown_peer_ttl(mut self, ttl: u32) -> Self {
        self.unknown_peer_ttl = ttl;
        self
    }

    /// Set the per-send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the number of concurrent sends. Zero is treated as one.
    pub fn with_max_concurrent_sends(mut self, count: usize) -> Self {
        self.max_concurrent_sends = count.max(1);
        self
    }

    /// Set the duplicate cache capacity.
    pub fn with_duplicate_cache_size(mut self, size: usize) -> Self {
        self.duplicate_cache_size = size;
        self
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    /// Enable or disable metric registration.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Scope both wire services to a group, as the service param.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.propagation_service = ServiceAddress::with_param(PROPAGATION_SERVICE_NAME, group.clone());
        self.control_service = ServiceAddress::with_param(CONTROL_SERVICE_NAME, group);
        self
    }
}
