// Path: crates/forge/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Forge CLI
//!
//! Runs a local validator network from a JSON network config until interrupted.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use netrunner_forge::{LocalNetwork, NetworkOptions, Node};
use netrunner_telemetry::prometheus::{gather_text, PrometheusSink};
use netrunner_types::NetworkConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(
    name = "forge",
    version,
    about = "Local validator network runner",
    long_about = "Forge starts a multi-node validator network on this machine, waits for it to become healthy and keeps it running until interrupted."
)]
struct ForgeCli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a network and keep it running until Ctrl+C.
    Run(RunArgs),

    /// Check a network config without starting anything.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Path to the JSON network config.
    #[clap(long)]
    config: PathBuf,
    /// Directory for node data. A temporary directory is used if omitted.
    #[clap(long)]
    root_dir: Option<PathBuf>,
    /// Node binary to use for every node, overriding the config.
    #[clap(long)]
    binary_path: Option<PathBuf>,
    /// Seconds to wait for all nodes to report healthy.
    #[clap(long, default_value = "120")]
    health_timeout: u64,
    /// Emit logs as JSON lines.
    #[clap(long)]
    json_logs: bool,
    /// Print Prometheus metrics before exiting.
    #[clap(long)]
    print_metrics: bool,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Path to the JSON network config.
    #[clap(long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ForgeCli::parse();

    match cli.command {
        Commands::Run(args) => run_network(args).await,
        Commands::Validate(args) => run_validate(args),
    }
}

fn load_config(path: &Path) -> Result<NetworkConfig> {
    let config = NetworkConfig::from_file(path)
        .with_context(|| format!("failed to load network config {}", path.display()))?;
    Ok(config)
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    netrunner_telemetry::init::init_tracing("info", false).map_err(|e| anyhow!("{e}"))?;
    let config = load_config(&args.config)?;
    config.validate().context("invalid network config")?;
    println!("✅ {} is valid", args.config.display());
    println!("   • Network ID: {}", config.network_id()?);
    println!("   • Nodes:      {}", config.node_configs.len());
    println!(
        "   • Beacons:    {}",
        config.node_configs.iter().filter(|n| n.is_beacon).count()
    );
    Ok(())
}

async fn run_network(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    let level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    netrunner_telemetry::init::init_tracing(&level, args.json_logs)
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    if let Some(binary_path) = &args.binary_path {
        config.set_binary_path(binary_path);
    }

    let mut options = NetworkOptions::new().with_metrics(Arc::new(PrometheusSink));
    if let Some(root_dir) = args.root_dir {
        options = options.with_root_dir(root_dir);
    }

    println!("🚀 Starting local network from {}...", args.config.display());
    let network = LocalNetwork::new(config, options)
        .await
        .context("failed to start network")?;

    let deadline = CancellationToken::new();
    let timer = {
        let deadline = deadline.clone();
        let timeout = Duration::from_secs(args.health_timeout);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            deadline.cancel();
        })
    };
    let healthy = network.healthy(deadline).await;
    timer.abort();

    if let Err(e) = healthy {
        shutdown(&network).await;
        return Err(anyhow!(e).context("network did not become healthy"));
    }

    let mut nodes: Vec<Node> = network.get_all_nodes().await?.into_values().collect();
    nodes.sort_by(|a, b| a.name().cmp(b.name()));

    println!("\n✅ Network is healthy!");
    println!("---------------------------------------------------------");
    println!("Network ID: {}", network.network_id());
    println!("Root dir:   {}", network.root_dir().display());
    for node in &nodes {
        println!("{}{}:", node.name(), if node.is_beacon() { " (beacon)" } else { "" });
        println!("  Node ID:   {}", node.node_id());
        println!("  API:       http://127.0.0.1:{}", node.api_port());
        println!("  P2P:       127.0.0.1:{}", node.p2p_port());
    }
    println!("---------------------------------------------------------");
    println!("Press Ctrl+C to stop.\n");

    signal::ctrl_c().await?;
    println!("\n🛑 Shutting down network...");
    shutdown(&network).await;

    if args.print_metrics {
        print!("{}", gather_text()?);
    }
    println!("Bye!");
    Ok(())
}

async fn shutdown(network: &LocalNetwork) {
    if let Err(e) = network.stop(CancellationToken::new()).await {
        tracing::error!(error = %e, "network did not stop cleanly");
    }
}
