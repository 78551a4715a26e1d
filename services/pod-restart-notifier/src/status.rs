//! Recording of observed state on the custom resource

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use serde_json::json;

use crate::crd::{PodNotifRestart, PodNotifRestartStatus, ResourceKey};

/// Persists the status of a `PodNotifRestart` after a cycle
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait StatusRecorder: Send + Sync {
    async fn record(&self, key: &ResourceKey, status: &PodNotifRestartStatus)
        -> crate::Result<()>;
}

/// Writes status through the status subresource with a merge patch
#[derive(Clone)]
pub struct KubeStatusRecorder {
    client: Client,
}

impl KubeStatusRecorder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusRecorder for KubeStatusRecorder {
    async fn record(
        &self,
        key: &ResourceKey,
        status: &PodNotifRestartStatus,
    ) -> crate::Result<()> {
        let api: Api<PodNotifRestart> = Api::namespaced(self.client.clone(), &key.namespace);
        let patch = json!({ "status": status });
        api.patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| crate::NotifierError::Status(format!("patching {}: {}", key, e)))?;
        tracing::debug!(
            "Recorded status for {}: notifications_sent={}",
            key,
            status.notifications_sent
        );
        Ok(())
    }
}

/// Status after a cycle that delivered `delivered` notifications at `now`
pub fn next_status(
    previous: Option<&PodNotifRestartStatus>,
    delivered: u32,
    now: DateTime<Utc>,
) -> PodNotifRestartStatus {
    let sent = previous.map(|s| s.notifications_sent).unwrap_or(0);
    PodNotifRestartStatus {
        last_checked: Some(now),
        notifications_sent: sent.saturating_add(delivered),
    }
}
