//! Pod Restart Notifier - Kubernetes operator for restarting containers
//!
//! Watches `PodNotifRestart` resources, finds containers whose restart count
//! reached the configured threshold, and posts alerts to Discord, Teams and
//! Slack webhooks.

pub mod channel;
pub mod config;
pub mod controller;
pub mod crd;
pub mod discord;
pub mod dispatcher;
pub mod error;
pub mod evaluator;
pub mod io;
pub mod pods;
pub mod reconciler;
pub mod slack;
pub mod status;
pub mod teams;

pub use config::{load_config, Config};
pub use error::{NotifierError, Result};

use std::sync::Arc;

use kube::{Client, CustomResourceExt};
use tokio_util::sync::CancellationToken;

use crate::io::ReqwestHttpClient;

/// The `PodNotifRestart` CustomResourceDefinition as YAML
pub fn crd_yaml() -> Result<String> {
    Ok(serde_yaml::to_string(&crd::PodNotifRestart::crd())?)
}

/// Run the controller with the given configuration until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn io::HttpClient> =
        Arc::new(ReqwestHttpClient::new(config.webhook_timeout())?);
    let client = Client::try_default().await?;
    let cancel = CancellationToken::new();

    if config.channels.is_empty() {
        tracing::debug!("No process-level channel endpoints configured");
    }

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    tracing::info!("Pod restart notifier started");
    controller::run(client, http, &config, cancel).await;
    tracing::info!("Pod restart notifier stopped");

    Ok(())
}
