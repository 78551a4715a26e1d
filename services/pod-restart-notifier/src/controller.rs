//! Controller wiring: drives reconciliation cycles for every `PodNotifRestart`

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use kube::api::Api;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::{predicates, reflector, watcher, WatchStreamExt};
use kube::{Client, ResourceExt};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::crd::{KubeResourceSource, PodNotifRestart, ResourceKey};
use crate::io::HttpClient;
use crate::pods::KubePodCollector;
use crate::reconciler::{CycleOutcome, Reconciler};
use crate::status::KubeStatusRecorder;
use crate::NotifierError;

/// Shared state handed to every reconcile call
pub struct ControllerContext {
    pub reconciler: Reconciler,
    pub requeue_interval: Duration,
    pub error_requeue_interval: Duration,
}

impl ControllerContext {
    pub fn new(reconciler: Reconciler, config: &Config) -> Self {
        Self {
            reconciler,
            requeue_interval: config.requeue_interval(),
            error_requeue_interval: config.error_requeue_interval(),
        }
    }
}

/// Action requested from the runtime once a cycle ends cleanly
pub fn next_action(outcome: &CycleOutcome, requeue_interval: Duration) -> Action {
    match outcome {
        CycleOutcome::ResourceGone => Action::await_change(),
        CycleOutcome::Completed(_) => Action::requeue(requeue_interval),
    }
}

pub async fn reconcile(
    resource: Arc<PodNotifRestart>,
    ctx: Arc<ControllerContext>,
) -> crate::Result<Action> {
    let key = ResourceKey::of(&resource)?;
    let outcome = ctx.reconciler.run_cycle(&key).await?;

    if let CycleOutcome::Completed(report) = &outcome {
        tracing::debug!(
            "Cycle for {} done: {} containers, {} qualifying, {} delivered",
            key,
            report.observations,
            report.events,
            report.delivered
        );
    }

    Ok(next_action(&outcome, ctx.requeue_interval))
}

pub fn error_policy(
    resource: Arc<PodNotifRestart>,
    error: &NotifierError,
    ctx: Arc<ControllerContext>,
) -> Action {
    tracing::warn!(
        "Reconcile of PodNotifRestart '{}' failed: {}",
        resource.name_any(),
        error
    );
    Action::requeue(ctx.error_requeue_interval)
}

/// Objects whose spec changed. Status patches leave `metadata.generation`
/// untouched, so they never start a cycle ahead of the requeue delay.
pub fn spec_changes<S>(
    events: S,
) -> impl Stream<Item = Result<PodNotifRestart, watcher::Error>> + Send + 'static
where
    S: Stream<Item = Result<watcher::Event<PodNotifRestart>, watcher::Error>> + Send + 'static,
{
    events
        .applied_objects()
        .predicate_filter(predicates::generation)
}

/// Run the controller until `cancel` is triggered
pub async fn run(
    client: Client,
    http: Arc<dyn HttpClient>,
    config: &Config,
    cancel: CancellationToken,
) {
    let reconciler = Reconciler::new(
        Arc::new(KubeResourceSource::new(client.clone())),
        Arc::new(KubePodCollector::new(client.clone())),
        Arc::new(KubeStatusRecorder::new(client.clone())),
        http,
        config.channels.clone(),
    );
    let ctx = Arc::new(ControllerContext::new(reconciler, config));
    let resources: Api<PodNotifRestart> = Api::all(client);
    let (reader, writer) = reflector::store();
    let events = watcher(resources, watcher::Config::default())
        .default_backoff()
        .reflect(writer);

    Controller::for_stream(spec_changes(events), reader)
        .graceful_shutdown_on(cancel.cancelled_owned())
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((object, _)) => tracing::debug!("Reconciled {}", object.name),
                Err(e) => tracing::warn!("Controller error: {}", e),
            }
        })
        .await;
}
