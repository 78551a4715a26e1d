//! The `PodNotifRestart` custom resource and access to it

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kube::api::Api;
use kube::{Client, CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{ChannelEndpoints, MonitorConfig, NamespaceScope};

/// Desired state of a `PodNotifRestart`
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "monitoring.vodafone.com",
    version = "v1",
    kind = "PodNotifRestart",
    plural = "podnotifrestarts",
    shortname = "pnr",
    namespaced,
    status = "PodNotifRestartStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct PodNotifRestartSpec {
    /// Namespaces to watch. Empty means every namespace.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces_to_monitor: Vec<String>,

    /// Minimum restart count before a notification is sent
    #[serde(default)]
    pub min_restarts: i32,

    #[serde(default, rename = "discordWebhookURL")]
    pub discord_webhook_url: String,

    #[serde(default, rename = "teamsWebhookURL")]
    pub teams_webhook_url: String,

    #[serde(default, rename = "slackWebhookURL")]
    pub slack_webhook_url: String,

    /// Legacy single endpoint field, not read by the controller
    #[serde(default, rename = "webhookURL")]
    pub webhook_url: String,
}

/// Observed state of a `PodNotifRestart`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodNotifRestartStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub last_checked: Option<DateTime<Utc>>,

    #[serde(default)]
    pub notifications_sent: u32,
}

impl PodNotifRestartSpec {
    pub fn namespaces_to_monitor(&self) -> &[String] {
        &self.namespaces_to_monitor
    }

    /// Configured threshold, with zero (unset) read as 1
    pub fn min_restarts(&self) -> u32 {
        u32::try_from(self.min_restarts).unwrap_or(0).max(1)
    }

    pub fn endpoints(&self) -> ChannelEndpoints {
        ChannelEndpoints {
            discord: self.discord_webhook_url.clone(),
            teams: self.teams_webhook_url.clone(),
            slack: self.slack_webhook_url.clone(),
        }
    }

    /// First non-empty endpoint in Discord, Teams, Slack order
    pub fn webhook_url(&self) -> &str {
        [
            &self.discord_webhook_url,
            &self.teams_webhook_url,
            &self.slack_webhook_url,
        ]
        .into_iter()
        .find(|url| !url.is_empty())
        .map(String::as_str)
        .unwrap_or("")
    }

    /// Admission rule: at least one channel endpoint must be given
    pub fn validate(&self) -> crate::Result<()> {
        if self.webhook_url().is_empty() {
            return Err(crate::NotifierError::Config(
                "at least one webhook URL should be specified".to_string(),
            ));
        }
        Ok(())
    }

    /// Admission defaulting: an unset threshold becomes 1
    pub fn apply_defaults(&mut self) {
        if self.min_restarts == 0 {
            self.min_restarts = 1;
        }
    }
}

impl PodNotifRestart {
    /// Snapshot of the monitoring settings, with process-level endpoints
    /// filling any channel the resource leaves empty
    pub fn monitor_config(&self, defaults: &ChannelEndpoints) -> MonitorConfig {
        MonitorConfig {
            scope: NamespaceScope::from_list(self.spec.namespaces_to_monitor()),
            min_restarts: self.spec.min_restarts(),
            endpoints: self.spec.endpoints().or_defaults(defaults),
        }
    }
}

/// Namespace and name of a `PodNotifRestart`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn of(resource: &PodNotifRestart) -> crate::Result<Self> {
        let namespace = resource.namespace().ok_or_else(|| {
            crate::NotifierError::Config(format!(
                "PodNotifRestart '{}' has no namespace",
                resource.name_any()
            ))
        })?;
        Ok(Self::new(namespace, resource.name_any()))
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Source of the current desired state of a resource
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ResourceSource: Send + Sync {
    /// Fetch the resource, or `None` when it no longer exists
    async fn fetch(&self, key: &ResourceKey) -> crate::Result<Option<PodNotifRestart>>;
}

/// Reads resources from the Kubernetes API
#[derive(Clone)]
pub struct KubeResourceSource {
    client: Client,
}

impl KubeResourceSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSource for KubeResourceSource {
    async fn fetch(&self, key: &ResourceKey) -> crate::Result<Option<PodNotifRestart>> {
        let api: Api<PodNotifRestart> = Api::namespaced(self.client.clone(), &key.namespace);
        let resource = api.get_opt(&key.name).await?;
        if resource.is_none() {
            tracing::debug!("PodNotifRestart {} not found", key);
        }
        Ok(resource)
    }
}
