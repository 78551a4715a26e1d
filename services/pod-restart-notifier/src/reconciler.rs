//! One reconciliation cycle: fetch, collect, evaluate, notify, record

use std::sync::Arc;

use chrono::Utc;

use crate::config::ChannelEndpoints;
use crate::crd::{PodNotifRestartStatus, ResourceKey, ResourceSource};
use crate::dispatcher::{DispatchError, Dispatcher};
use crate::evaluator::evaluate;
use crate::io::HttpClient;
use crate::pods::PodCollector;
use crate::status::{next_status, StatusRecorder};

/// How a cycle ended when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The resource was deleted before the cycle could read it
    ResourceGone,
    Completed(CycleReport),
}

/// Summary of a completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub observations: usize,
    pub events: usize,
    /// Events delivered by at least one channel
    pub delivered: u32,
    pub status: PodNotifRestartStatus,
}

/// Runs reconciliation cycles against injected collaborators
pub struct Reconciler {
    resources: Arc<dyn ResourceSource>,
    collector: Arc<dyn PodCollector>,
    recorder: Arc<dyn StatusRecorder>,
    http: Arc<dyn HttpClient>,
    default_endpoints: ChannelEndpoints,
}

impl Reconciler {
    pub fn new(
        resources: Arc<dyn ResourceSource>,
        collector: Arc<dyn PodCollector>,
        recorder: Arc<dyn StatusRecorder>,
        http: Arc<dyn HttpClient>,
        default_endpoints: ChannelEndpoints,
    ) -> Self {
        Self {
            resources,
            collector,
            recorder,
            http,
            default_endpoints,
        }
    }

    /// Run one cycle for the resource identified by `key`.
    ///
    /// Processing stops at the first event whose dispatch had a failing
    /// channel. Status is still written for everything delivered up to that
    /// point before the dispatch error is returned. A failed status write
    /// fails the cycle only when no dispatch error is pending.
    pub async fn run_cycle(&self, key: &ResourceKey) -> crate::Result<CycleOutcome> {
        let Some(resource) = self.resources.fetch(key).await? else {
            tracing::debug!("PodNotifRestart {} is gone, ending cycle", key);
            return Ok(CycleOutcome::ResourceGone);
        };

        let monitor = resource.monitor_config(&self.default_endpoints);
        tracing::debug!(
            "Cycle for {}: scope={}, min_restarts={}",
            key,
            monitor.scope,
            monitor.min_restarts
        );

        let observations = self.collector.collect(&monitor.scope).await?;
        let events = evaluate(&observations, monitor.min_restarts);

        let dispatcher = Dispatcher::from_endpoints(&monitor.endpoints, Arc::clone(&self.http));
        if dispatcher.is_empty() && !events.is_empty() {
            tracing::info!(
                "{} has {} qualifying containers but no channel endpoints",
                key,
                events.len()
            );
        }

        let mut delivered = 0u32;
        let mut failure: Option<DispatchError> = None;
        for event in &events {
            tracing::info!(
                "Sending restart notification: pod={}, container={}, restart_count={}",
                event.observation.pod_name,
                event.observation.container_name,
                event.observation.restart_count
            );

            let report = dispatcher.dispatch(&event.message).await;
            if report.delivered() {
                delivered += 1;
            }
            if let Err(e) = report.into_result() {
                tracing::error!("Failed to send notification for {}: {}", key, e);
                failure = Some(e);
                break;
            }
        }

        let status = next_status(resource.status.as_ref(), delivered, Utc::now());
        let recorded = self.recorder.record(key, &status).await;

        if let Some(e) = failure {
            if let Err(status_err) = recorded {
                tracing::error!("Failed to record status for {}: {}", key, status_err);
            }
            return Err(e.into());
        }
        recorded?;

        Ok(CycleOutcome::Completed(CycleReport {
            observations: observations.len(),
            events: events.len(),
            delivered,
            status,
        }))
    }
}
