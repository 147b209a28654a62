//! Passgate CLI: command-line client for the verification node.
//!
//! Subcommands: status, present, retry, deliver, probe.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Passgate: identity-wallet verification sessions.
#[derive(Parser, Debug)]
#[command(name = "passgate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the current verification session.
    Status(commands::status::StatusArgs),
    /// Print the request to hand to the wallet.
    Present(commands::present::PresentArgs),
    /// Start a fresh session after a failure.
    Retry(commands::retry::RetryArgs),
    /// Deliver a prover result, as the wallet callback would.
    Deliver(commands::deliver::DeliverArgs),
    /// Check the verification backend's health directly.
    Probe(commands::probe::ProbeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Present(args) => commands::present::run(args).await,
        Commands::Retry(args) => commands::retry::run(args).await,
        Commands::Deliver(args) => commands::deliver::run(args).await,
        Commands::Probe(args) => commands::probe::run(args).await,
    }
}
