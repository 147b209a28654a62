//! Passgate Node: entry point.
//!
//! Hosts one verification session with configuration from a TOML file or defaults.

// Some node accessors are only exercised by tests.
#![allow(dead_code)]

mod api;
mod commands;
mod config;
mod node;
mod state;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::PassgateConfig;
use node::PassgateNode;

/// Passgate Node
#[derive(Parser, Debug)]
#[command(name = "passgate-node", version, about = "Passgate verification node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "passgate.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the verification backend base URL.
    #[arg(long, env = "PASSGATE_BACKEND_URL")]
    backend_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        let config = PassgateConfig::default();
        config.save(&args.config)?;
        println!("wrote default config to {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = PassgateConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(backend_url) = args.backend_url {
        config.backend.url = backend_url;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        "text" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        other => anyhow::bail!("unknown log format: {other} (expected text or json)"),
    }

    tracing::info!("Passgate Node v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        backend = %config.backend.url,
        app = %config.app.app_name,
        scope = %config.app.scope,
        "loaded configuration"
    );

    // Create and start the node
    let mut node = PassgateNode::new(config)?;
    node.start().await?;

    // Set up graceful shutdown on SIGINT
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::info!("received shutdown signal");
    };

    tokio::select! {
        result = node.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "node event loop error");
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    node.shutdown().await?;
    tracing::info!("Passgate node exited cleanly");
    Ok(())
}
