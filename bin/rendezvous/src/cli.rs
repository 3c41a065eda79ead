//! Rendezvous CLI entry point.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rendezvous_observability::LogArgs;

/// Rendezvous overlay tooling.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct RendezvousCli {
    /// Logging configuration (applies to all subcommands).
    #[command(flatten)]
    pub logs: LogArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Flood one message through an in-process overlay and report its reach.
    Sim(SimArgs),
}

/// Arguments for the 'sim' command.
///
/// Propagation settings come from the config file or `RENDEZVOUS_PROPAGATION__*`
/// environment variables; the flags here override the topology.
#[derive(Debug, Args)]
#[command(next_help_heading = "Simulation")]
pub struct SimArgs {
    /// Path to a TOML config file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of nodes in the ring.
    #[arg(long = "sim.nodes")]
    pub nodes: Option<usize>,

    /// Random extra links per node.
    #[arg(long = "sim.chords")]
    pub chords: Option<usize>,

    /// TTL the flood is injected with.
    #[arg(long = "sim.ttl")]
    pub ttl: Option<u32>,

    /// Seed for chord placement.
    #[arg(long = "sim.seed")]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_flags() {
        let cli = RendezvousCli::try_parse_from([
            "rendezvous",
            "-v",
            "sim",
            "--sim.nodes",
            "10",
            "--sim.seed",
            "42",
        ])
        .unwrap();

        assert_eq!(cli.logs.verbosity, 1);
        let Commands::Sim(args) = cli.command;
        assert_eq!(args.nodes, Some(10));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.ttl, None);
    }
}
