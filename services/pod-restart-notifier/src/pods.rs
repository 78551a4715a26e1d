//! Pod restart counter collection

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};

use crate::config::NamespaceScope;

/// Restart counter of one container at observation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRestartObservation {
    pub namespace: String,
    pub pod_name: String,
    pub container_name: String,
    pub restart_count: u32,
}

/// Reports the restart counters of every container in a namespace scope
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PodCollector: Send + Sync {
    /// List current observations, in the order pods and containers are returned
    async fn collect(
        &self,
        scope: &NamespaceScope,
    ) -> crate::Result<Vec<ContainerRestartObservation>>;
}

/// Lists pods through the Kubernetes API
#[derive(Clone)]
pub struct KubePodCollector {
    client: Client,
}

impl KubePodCollector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list(&self, api: Api<Pod>, label: &str) -> crate::Result<Vec<Pod>> {
        let pods = api.list(&ListParams::default()).await.map_err(|e| {
            crate::NotifierError::Collector(format!("listing pods in {}: {}", label, e))
        })?;
        tracing::debug!("Listed {} pods in {}", pods.items.len(), label);
        Ok(pods.items)
    }
}

#[async_trait]
impl PodCollector for KubePodCollector {
    async fn collect(
        &self,
        scope: &NamespaceScope,
    ) -> crate::Result<Vec<ContainerRestartObservation>> {
        let pods = match scope {
            NamespaceScope::All => {
                self.list(Api::all(self.client.clone()), "all namespaces")
                    .await?
            }
            NamespaceScope::Namespaces(namespaces) => {
                let mut pods = Vec::new();
                for namespace in namespaces {
                    let api = Api::namespaced(self.client.clone(), namespace);
                    pods.extend(self.list(api, namespace).await?);
                }
                pods
            }
        };
        Ok(observations_from_pods(&pods))
    }
}

/// Flatten pods into per-container observations. Pods without a reported
/// status contribute nothing.
pub fn observations_from_pods(pods: &[Pod]) -> Vec<ContainerRestartObservation> {
    let mut observations = Vec::new();
    for pod in pods {
        let statuses = pod
            .status
            .as_ref()
            .and_then(|s| s.container_statuses.as_ref());
        let Some(statuses) = statuses else {
            continue;
        };
        for status in statuses {
            observations.push(ContainerRestartObservation {
                namespace: pod.namespace().unwrap_or_default(),
                pod_name: pod.name_any(),
                container_name: status.name.clone(),
                restart_count: u32::try_from(status.restart_count).unwrap_or(0),
            });
        }
    }
    observations
}
