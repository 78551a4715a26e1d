//! Error types for the pod restart notifier

use crate::dispatcher::DispatchError;

/// Errors that can occur in the pod restart notifier
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Pod collection failed: {0}")]
    Collector(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Notification dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Status update failed: {0}")]
    Status(String),
}

/// Result type alias for notifier operations
pub type Result<T> = std::result::Result<T, NotifierError>;
