//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments (applied after Figment load)
//! 2. Config file (TOML)
//! 3. Environment variables (`RENDEZVOUS_` prefix, `__` between sections)
//! 4. Defaults

use std::path::Path;

use eyre::{Result, WrapErr};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use rendezvous_propagation::PropagationArgs;
use serde::{Deserialize, Serialize};

use crate::cli::SimArgs;

/// Overlay shape and flood parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Number of nodes in the ring.
    pub nodes: usize,
    /// Random extra links per node.
    pub chords: usize,
    /// TTL the flood is injected with.
    pub ttl: u32,
    /// Seed for chord placement; random when absent.
    pub seed: Option<u64>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            nodes: 32,
            chords: 2,
            ttl: 8,
            seed: None,
        }
    }
}

/// Complete simulator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub topology: TopologyConfig,
    pub propagation: PropagationArgs,
}

impl SimConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides should be applied separately after loading.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(SimConfig::default()))
            .merge(Env::prefixed("RENDEZVOUS_").split("__"));

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.extract().wrap_err("Failed to load configuration")
    }

    /// Apply CLI overrides.
    pub fn apply_args(&mut self, args: &SimArgs) {
        if let Some(nodes) = args.nodes {
            self.topology.nodes = nodes;
        }
        if let Some(chords) = args.chords {
            self.topology.chords = chords;
        }
        if let Some(ttl) = args.ttl {
            self.topology.ttl = ttl;
        }
        if args.seed.is_some() {
            self.topology.seed = args.seed;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.topology.nodes < 2 {
            eyre::bail!("the overlay needs at least 2 nodes");
        }
        self.propagation.validate().map_err(|e| eyre::eyre!(e))
    }
}
