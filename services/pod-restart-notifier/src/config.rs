//! Configuration types for the pod restart notifier

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Process-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Channel endpoints used when a resource leaves its own field empty
    #[serde(default)]
    pub channels: ChannelEndpoints,
    #[serde(default = "default_requeue_interval")]
    pub requeue_interval_seconds: u64,
    #[serde(default = "default_requeue_interval")]
    pub error_requeue_interval_seconds: u64,
    /// Per-request webhook timeout. Unset or 0 leaves the transport default.
    #[serde(default)]
    pub webhook_timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channels: ChannelEndpoints::default(),
            requeue_interval_seconds: default_requeue_interval(),
            error_requeue_interval_seconds: default_requeue_interval(),
            webhook_timeout_seconds: None,
        }
    }
}

impl Config {
    pub fn requeue_interval(&self) -> Duration {
        Duration::from_secs(self.requeue_interval_seconds)
    }

    pub fn error_requeue_interval(&self) -> Duration {
        Duration::from_secs(self.error_requeue_interval_seconds)
    }

    pub fn webhook_timeout(&self) -> Option<Duration> {
        self.webhook_timeout_seconds
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Overlay channel endpoints from the `*_WEBHOOK_URL` environment variables
    pub fn resolve_env(&mut self) {
        self.resolve_env_with(|name| std::env::var(name).ok());
    }

    /// Overlay channel endpoints using `lookup` to read variables.
    ///
    /// Unset or empty variables leave the file value untouched.
    pub fn resolve_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for kind in ChannelKind::ALL {
            if let Some(value) = lookup(kind.env_var()).filter(|v| !v.is_empty()) {
                tracing::debug!("Using {} endpoint from {}", kind, kind.env_var());
                self.channels.set(kind, value);
            }
        }
    }
}

/// The chat integrations a notification can be delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Discord,
    Teams,
    Slack,
}

impl ChannelKind {
    /// Built-in kinds in registration order
    pub const ALL: [ChannelKind; 3] = [ChannelKind::Discord, ChannelKind::Teams, ChannelKind::Slack];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Discord => "discord",
            ChannelKind::Teams => "teams",
            ChannelKind::Slack => "slack",
        }
    }

    /// Environment variable holding the process-level endpoint
    pub fn env_var(&self) -> &'static str {
        match self {
            ChannelKind::Discord => "DISCORD_WEBHOOK_URL",
            ChannelKind::Teams => "TEAMS_WEBHOOK_URL",
            ChannelKind::Slack => "SLACK_WEBHOOK_URL",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Webhook endpoint per channel kind. An empty string disables the channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEndpoints {
    #[serde(default)]
    pub discord: String,
    #[serde(default)]
    pub teams: String,
    #[serde(default)]
    pub slack: String,
}

impl ChannelEndpoints {
    pub fn get(&self, kind: ChannelKind) -> &str {
        match kind {
            ChannelKind::Discord => &self.discord,
            ChannelKind::Teams => &self.teams,
            ChannelKind::Slack => &self.slack,
        }
    }

    pub fn set(&mut self, kind: ChannelKind, url: impl Into<String>) {
        let url = url.into();
        match kind {
            ChannelKind::Discord => self.discord = url,
            ChannelKind::Teams => self.teams = url,
            ChannelKind::Slack => self.slack = url,
        }
    }

    /// Merge with process defaults: a non-empty value here wins, otherwise
    /// the fallback's value is used.
    pub fn or_defaults(&self, defaults: &ChannelEndpoints) -> ChannelEndpoints {
        let mut merged = ChannelEndpoints::default();
        for kind in ChannelKind::ALL {
            let own = self.get(kind);
            let url = if own.is_empty() { defaults.get(kind) } else { own };
            merged.set(kind, url);
        }
        merged
    }

    /// Enabled channels in registration order
    pub fn enabled(&self) -> Vec<(ChannelKind, &str)> {
        ChannelKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, url)| !url.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled().is_empty()
    }
}

/// Namespaces whose pods are inspected in a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceScope {
    All,
    Namespaces(Vec<String>),
}

impl NamespaceScope {
    pub fn from_list(namespaces: &[String]) -> Self {
        if namespaces.is_empty() {
            NamespaceScope::All
        } else {
            NamespaceScope::Namespaces(namespaces.to_vec())
        }
    }
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceScope::All => write!(f, "all namespaces"),
            NamespaceScope::Namespaces(list) => write!(f, "namespaces [{}]", list.join(", ")),
        }
    }
}

/// Desired monitoring state for one resource, read once at the start of a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub scope: NamespaceScope,
    /// Always at least 1
    pub min_restarts: u32,
    pub endpoints: ChannelEndpoints,
}

fn default_requeue_interval() -> u64 {
    120
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::NotifierError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
