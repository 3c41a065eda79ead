//! Rendezvous overlay binary.

mod cli;
mod config;
mod sim;

use clap::Parser;
use tracing::info;

use crate::cli::{Commands, RendezvousCli, SimArgs};
use crate::config::SimConfig;
use crate::sim::Simulation;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = RendezvousCli::parse();
    rendezvous_observability::init_logging(&cli.logs)?;

    match cli.command {
        Commands::Sim(args) => run_sim(args).await,
    }
}

async fn run_sim(args: SimArgs) -> eyre::Result<()> {
    let mut config = SimConfig::load(args.config.as_deref())?;
    config.apply_args(&args);
    config.validate()?;

    info!(
        nodes = config.topology.nodes,
        chords = config.topology.chords,
        ttl = config.topology.ttl,
        role = %config.propagation.role,
        "starting flood simulation"
    );

    let report = Simulation::build(&config)?.run().await?;

    info!(
        nodes = report.nodes,
        links = report.links,
        reached = report.reached,
        messages = report.messages,
        duplicates = report.duplicates,
        repropagated = report.repropagated,
        "flood complete"
    );
    Ok(())
}
