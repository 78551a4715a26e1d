//! BDD step definitions for the reconciliation feature

use std::sync::Arc;

use cucumber::{given, then, when};
use tokio::sync::RwLock;

use pod_restart_notifier::config::{ChannelKind, NamespaceScope};
use pod_restart_notifier::crd::{
    PodNotifRestart, PodNotifRestartSpec, PodNotifRestartStatus, ResourceKey, ResourceSource,
};
use pod_restart_notifier::pods::{ContainerRestartObservation, PodCollector};
use pod_restart_notifier::reconciler::{CycleOutcome, Reconciler};
use pod_restart_notifier::status::StatusRecorder;
use pod_restart_notifier::NotifierError;

use crate::world::NotifierWorld;

// --- Test doubles ---

/// A resource source holding at most one resource
#[derive(Debug)]
struct StaticSource {
    resource: Option<PodNotifRestart>,
}

#[async_trait::async_trait]
impl ResourceSource for StaticSource {
    async fn fetch(
        &self,
        _key: &ResourceKey,
    ) -> pod_restart_notifier::Result<Option<PodNotifRestart>> {
        Ok(self.resource.clone())
    }
}

/// A collector returning canned observations and counting calls
#[derive(Debug)]
struct CannedCollector {
    observations: Vec<ContainerRestartObservation>,
    fail: bool,
    calls: Arc<RwLock<u32>>,
}

#[async_trait::async_trait]
impl PodCollector for CannedCollector {
    async fn collect(
        &self,
        _scope: &NamespaceScope,
    ) -> pod_restart_notifier::Result<Vec<ContainerRestartObservation>> {
        *self.calls.write().await += 1;
        if self.fail {
            return Err(NotifierError::Collector(
                "listing pods in all namespaces: apiserver unavailable".to_string(),
            ));
        }
        Ok(self.observations.clone())
    }
}

/// A status recorder that keeps every recorded status
#[derive(Debug)]
struct MemoryRecorder {
    recorded: Arc<RwLock<Vec<PodNotifRestartStatus>>>,
}

#[async_trait::async_trait]
impl StatusRecorder for MemoryRecorder {
    async fn record(
        &self,
        _key: &ResourceKey,
        status: &PodNotifRestartStatus,
    ) -> pod_restart_notifier::Result<()> {
        self.recorded.write().await.push(status.clone());
        Ok(())
    }
}

fn key() -> ResourceKey {
    ResourceKey::new("monitoring", "restart-watch")
}

// --- Steps ---

#[given(expr = "a PodNotifRestart with min restarts {int}")]
fn resource_with_threshold(world: &mut NotifierWorld, min_restarts: i32) {
    world.spec = Some(PodNotifRestartSpec {
        min_restarts,
        ..Default::default()
    });
}

#[given(expr = "the resource monitors namespace {string}")]
fn resource_namespace(world: &mut NotifierWorld, namespace: String) {
    world
        .spec
        .as_mut()
        .expect("no resource defined")
        .namespaces_to_monitor
        .push(namespace);
}

#[given("the PodNotifRestart has been deleted")]
fn resource_deleted(world: &mut NotifierWorld) {
    world.resource_deleted = true;
}

#[given(expr = "pod {string} has a container restarted {int} time(s)")]
fn pod_restarted(world: &mut NotifierWorld, pod: String, restarts: u32) {
    world.observations.push(ContainerRestartObservation {
        namespace: "default".to_string(),
        pod_name: pod,
        container_name: "app".to_string(),
        restart_count: restarts,
    });
}

#[given("the pod listing fails")]
fn listing_fails(world: &mut NotifierWorld) {
    world.listing_fails = true;
}

#[when("a reconciliation cycle runs")]
async fn run_cycle(world: &mut NotifierWorld) {
    let resource = if world.resource_deleted {
        None
    } else {
        let mut spec = world.spec.clone().unwrap_or_default();
        spec.discord_webhook_url = world.endpoints.get(ChannelKind::Discord).to_string();
        spec.teams_webhook_url = world.endpoints.get(ChannelKind::Teams).to_string();
        spec.slack_webhook_url = world.endpoints.get(ChannelKind::Slack).to_string();
        let mut resource = PodNotifRestart::new("restart-watch", spec);
        resource.metadata.namespace = Some("monitoring".to_string());
        Some(resource)
    };

    let calls = Arc::new(RwLock::new(0));
    let recorded = Arc::new(RwLock::new(Vec::new()));
    world.list_calls = Some(Arc::clone(&calls));
    world.recorded = Some(Arc::clone(&recorded));

    let http = world.build_http();
    let reconciler = Reconciler::new(
        Arc::new(StaticSource { resource }),
        Arc::new(CannedCollector {
            observations: world.observations.clone(),
            fail: world.listing_fails,
            calls,
        }),
        Arc::new(MemoryRecorder { recorded }),
        http,
        Default::default(),
    );

    world.cycle_result = Some(reconciler.run_cycle(&key()).await);
}

#[then("the cycle should complete")]
fn cycle_completes(world: &mut NotifierWorld) {
    let result = world.cycle_result.as_ref().expect("no cycle result");
    match result {
        Ok(CycleOutcome::Completed(_)) => {}
        other => panic!("expected completed cycle, got {:?}", other),
    }
}

#[then("the cycle should end because the resource is gone")]
fn cycle_gone(world: &mut NotifierWorld) {
    let result = world.cycle_result.as_ref().expect("no cycle result");
    assert!(
        matches!(result, Ok(CycleOutcome::ResourceGone)),
        "got {:?}",
        result
    );
}

#[then(expr = "the cycle should fail with the last error from {string}")]
fn cycle_fails_dispatch(world: &mut NotifierWorld, channel: String) {
    let result = world.cycle_result.as_ref().expect("no cycle result");
    match result {
        Err(NotifierError::Dispatch(e)) => assert_eq!(e.last().channel, channel),
        other => panic!("expected dispatch error, got {:?}", other),
    }
}

#[then("the cycle should fail with a collector error")]
fn cycle_fails_collector(world: &mut NotifierWorld) {
    let result = world.cycle_result.as_ref().expect("no cycle result");
    assert!(
        matches!(result, Err(NotifierError::Collector(_))),
        "got {:?}",
        result
    );
}

#[then("no pods should have been listed")]
async fn no_listing(world: &mut NotifierWorld) {
    let calls = world.list_calls.as_ref().expect("cycle did not run");
    assert_eq!(*calls.read().await, 0);
}

#[then("no status should have been recorded")]
async fn no_status(world: &mut NotifierWorld) {
    let recorded = world.recorded.as_ref().expect("cycle did not run");
    assert!(recorded.read().await.is_empty());
}

#[then(expr = "the recorded notifications sent should be {int}")]
async fn recorded_sent(world: &mut NotifierWorld, sent: u32) {
    let recorded = world.recorded.as_ref().expect("cycle did not run");
    let recorded = recorded.read().await;
    let status = recorded.last().expect("no status recorded");
    assert_eq!(status.notifications_sent, sent);
}

#[then("the last checked timestamp should be recorded")]
async fn last_checked_recorded(world: &mut NotifierWorld) {
    let recorded = world.recorded.as_ref().expect("cycle did not run");
    let recorded = recorded.read().await;
    let status = recorded.last().expect("no status recorded");
    assert!(status.last_checked.is_some());
}
