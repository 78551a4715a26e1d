//! BDD test world for the pod restart notifier

use std::collections::HashMap;
use std::sync::Arc;

use cucumber::World;
use tokio::sync::RwLock;

use pod_restart_notifier::config::ChannelEndpoints;
use pod_restart_notifier::crd::{PodNotifRestartSpec, PodNotifRestartStatus};
use pod_restart_notifier::dispatcher::DispatchReport;
use pod_restart_notifier::io::{HttpClient, HttpResponse};
use pod_restart_notifier::pods::ContainerRestartObservation;
use pod_restart_notifier::reconciler::CycleOutcome;
use pod_restart_notifier::NotifierError;

/// How a webhook URL answers
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    Unreachable,
}

/// A recorded webhook POST
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub body: serde_json::Value,
}

/// An HTTP client that records every POST and answers per URL (200 by default)
#[derive(Debug, Default)]
pub struct RecordingHttpClient {
    pub replies: HashMap<String, Reply>,
    pub requests: RwLock<Vec<RecordedRequest>>,
}

impl RecordingHttpClient {
    pub async fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl HttpClient for RecordingHttpClient {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> pod_restart_notifier::Result<HttpResponse> {
        self.requests.write().await.push(RecordedRequest {
            url: url.to_string(),
            body: body.clone(),
        });
        match self.replies.get(url).cloned().unwrap_or(Reply::Status(200)) {
            Reply::Status(status) => Ok(HttpResponse {
                status,
                body: String::new(),
            }),
            Reply::Unreachable => Err(NotifierError::Http(format!(
                "POST {} failed: connection refused",
                url
            ))),
        }
    }
}

#[derive(Debug, Default, World)]
pub struct NotifierWorld {
    // Channel configuration shared by dispatch and reconcile scenarios
    pub endpoints: ChannelEndpoints,
    pub replies: HashMap<String, Reply>,
    pub http: Option<Arc<RecordingHttpClient>>,

    // Dispatch testing
    pub dispatch_report: Option<DispatchReport>,

    // Reconcile testing
    pub spec: Option<PodNotifRestartSpec>,
    pub resource_deleted: bool,
    pub observations: Vec<ContainerRestartObservation>,
    pub listing_fails: bool,
    pub list_calls: Option<Arc<RwLock<u32>>>,
    pub recorded: Option<Arc<RwLock<Vec<PodNotifRestartStatus>>>>,
    pub cycle_result: Option<pod_restart_notifier::Result<CycleOutcome>>,
}

impl NotifierWorld {
    /// Build the recording client from the configured replies
    pub fn build_http(&mut self) -> Arc<RecordingHttpClient> {
        let http = Arc::new(RecordingHttpClient {
            replies: self.replies.clone(),
            requests: RwLock::new(Vec::new()),
        });
        self.http = Some(Arc::clone(&http));
        http
    }

    pub fn http(&self) -> &RecordingHttpClient {
        self.http.as_ref().expect("no HTTP client built")
    }
}
