//! Pod restart notifier CLI
//!
//! Command-line entry point for the restart notification operator.

use std::path::PathBuf;

use clap::Parser;
use pod_restart_notifier::{crd_yaml, load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "pod-restart-notifier")]
#[command(about = "Kubernetes operator that reports restarting pods to chat webhooks")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Print the CustomResourceDefinition as YAML and exit
    #[arg(long)]
    print_crd: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_crd {
        print!("{}", crd_yaml()?);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, log_level={:?}",
        args.config,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.resolve_env();

    tracing::info!("Starting pod restart notifier");
    tracing::debug!(
        "Requeue interval: {:?}, webhook timeout: {:?}",
        config.requeue_interval(),
        config.webhook_timeout()
    );

    pod_restart_notifier::run(config).await?;

    Ok(())
}
