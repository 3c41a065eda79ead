//! Propagation CLI arguments.

use std::time::Duration;

use clap::Args;
use rendezvous_message::DEFAULT_MAX_TTL;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_DUPLICATE_CACHE_SIZE, DEFAULT_MAX_CONCURRENT_SENDS, DEFAULT_SEND_TIMEOUT,
    DEFAULT_UNKNOWN_PEER_TTL, NodeRole, PropagationConfig,
};

const DEFAULT_SEND_TIMEOUT_MS: u64 = DEFAULT_SEND_TIMEOUT.as_millis() as u64;

/// Flood propagation configuration.
#[derive(Debug, Args, Clone, Serialize, Deserialize)]
#[command(next_help_heading = "Propagation")]
#[serde(default)]
pub struct PropagationArgs {
    /// Role of this node.
    ///
    /// - edge: leaf participant, never repropagates
    /// - rendezvous: relays received floods to its neighbors (default)
    #[arg(long = "propagation.role", value_enum, default_value_t = NodeRole::Rendezvous)]
    pub role: NodeRole,

    /// Maximum hop budget of any message.
    #[arg(long = "propagation.max-ttl", default_value_t = DEFAULT_MAX_TTL)]
    pub max_ttl: u32,

    /// TTL cap for messages from unrecognized peers and the raw network.
    #[arg(long = "propagation.unknown-peer-ttl", default_value_t = DEFAULT_UNKNOWN_PEER_TTL)]
    pub unknown_peer_ttl: u32,

    /// Timeout for a single per-destination send, in milliseconds.
    #[arg(long = "propagation.send-timeout-ms", default_value_t = DEFAULT_SEND_TIMEOUT_MS)]
    pub send_timeout_ms: u64,

    /// Number of per-destination sends in flight at once.
    #[arg(long = "propagation.max-concurrent-sends", default_value_t = DEFAULT_MAX_CONCURRENT_SENDS)]
    pub max_concurrent_sends: usize,

    /// Number of message ids remembered for duplicate detection.
    #[arg(long = "propagation.duplicate-cache-size", default_value_t = DEFAULT_DUPLICATE_CACHE_SIZE)]
    pub duplicate_cache_size: usize,

    /// Disable propagation metrics.
    #[arg(long = "propagation.no-metrics")]
    pub no_metrics: bool,
}

impl Default for PropagationArgs {
    fn default() -> Self {
        Self {
            role: NodeRole::default(),
            max_ttl: DEFAULT_MAX_TTL,
            unknown_peer_ttl: DEFAULT_UNKNOWN_PEER_TTL,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            max_concurrent_sends: DEFAULT_MAX_CONCURRENT_SENDS,
            duplicate_cache_size: DEFAULT_DUPLICATE_CACHE_SIZE,
            no_metrics: false,
        }
    }
}

impl PropagationArgs {
    /// Validate argument values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_ttl == 0 {
            return Err("max-ttl must be at least 1".to_string());
        }
        if self.unknown_peer_ttl > self.max_ttl {
            return Err(format!(
                "unknown-peer-ttl ({}) must not exceed max-ttl ({})",
                self.unknown_peer_ttl, self.max_ttl
            ));
        }
        if self.send_timeout_ms == 0 {
            return Err("send-timeout-ms must be greater than 0".to_string());
        }
        if self.max_concurrent_sends == 0 {
            return Err("max-concurrent-sends must be at least 1".to_string());
        }
        if self.duplicate_cache_size == 0 {
            return Err("duplicate-cache-size must be at least 1".to_string());
        }
        Ok(())
    }
}

impl From<&PropagationArgs> for PropagationConfig {
    fn from(args: &PropagationArgs) -> Self {
        PropagationConfig::default()
            .with_role(args.role)
            .with_max_ttl(args.max_ttl)
            .with_unknown_peer_ttl(args.unknown_peer_ttl)
            .with_send_timeout(Duration::from_millis(args.send_timeout_ms))
            .with_max_concurrent_sends(args.max_concurrent_sends)
            .with_duplicate_cache_size(args.duplicate_cache_size)
            .with_metrics(!args.no_metrics)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        propagation: PropagationArgs,
    }

    #[test]
    fn test_default_args_are_valid() {
        let args = PropagationArgs::default();
        assert!(args.validate().is_ok());

        let config = PropagationConfig::from(&args);
        assert_eq!(config.max_ttl, DEFAULT_MAX_TTL);
        assert_eq!(config.send_timeout, DEFAULT_SEND_TIMEOUT);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_parse_dotted_flags() {
        let cli = TestCli::parse_from([
            "test",
            "--propagation.role",
            "edge",
            "--propagation.max-ttl",
            "12",
            "--propagation.no-metrics",
        ]);
        assert_eq!(cli.propagation.role, NodeRole::Edge);
        assert_eq!(cli.propagation.max_ttl, 12);
        assert!(cli.propagation.no_metrics);
        assert_eq!(cli.propagation.unknown_peer_ttl, DEFAULT_UNKNOWN_PEER_TTL);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let args = PropagationArgs {
            max_ttl: 2,
            ..Default::default()
        };
        assert!(args.validate().is_err());

        let args = PropagationArgs {
            max_concurrent_sends: 0,
            ..Default::default()
        };
        assert!(args.validate().is_err());

        let args = PropagationArgs {
            max_ttl: 0,
            unknown_peer_ttl: 0,
            ..Default::default()
        };
        assert!(args.validate().is_err());
    }
}
