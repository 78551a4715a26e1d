//! Slack incoming webhook channel

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::channel::{post_webhook, Channel};
use crate::io::HttpClient;

/// Slack incoming webhook sender
pub struct SlackChannel {
    webhook_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for SlackChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackChannel").finish_non_exhaustive()
    }
}

impl SlackChannel {
    pub fn new(webhook_url: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            http,
        }
    }

    pub fn payload(message: &str) -> serde_json::Value {
        json!({ "text": message })
    }
}

#[async_trait]
impl Channel for SlackChannel {
    fn type_name(&self) -> &str {
        "slack"
    }

    async fn notify(&self, message: &str) -> crate::Result<()> {
        post_webhook(
            self.http.as_ref(),
            self.type_name(),
            &self.webhook_url,
            &Self::payload(message),
        )
        .await
    }
}
