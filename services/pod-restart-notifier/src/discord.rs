//! Discord webhook channel

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::channel::{post_webhook, Channel};
use crate::io::HttpClient;

/// Discord webhook sender
pub struct DiscordChannel {
    webhook_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for DiscordChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordChannel").finish_non_exhaustive()
    }
}

impl DiscordChannel {
    pub fn new(webhook_url: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            http,
        }
    }

    pub fn payload(message: &str) -> serde_json::Value {
        json!({ "content": message })
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn type_name(&self) -> &str {
        "discord"
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
