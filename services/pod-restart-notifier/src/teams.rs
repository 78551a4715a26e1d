//! Microsoft Teams message card channel

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::channel::{post_webhook, Channel};
use crate::io::HttpClient;

const CARD_SUMMARY: &str = "Pod Restart Notification";
const THEME_COLOR: &str = "0078D7";

/// Teams incoming webhook sender
pub struct TeamsChannel {
    webhook_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for TeamsChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamsChannel").finish_non_exhaustive()
    }
}

impl TeamsChannel {
    pub fn new(webhook_url: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            http,
        }
    }

    /// Legacy "MessageCard" connector payload
    pub fn payload(message: &str) -> serde_json::Value {
        json!({
            "@type": "MessageCard",
            "@context": "http://schema.org/extensions",
            "summary": CARD_SUMMARY,
            "themeColor": THEME_COLOR,
            "text": message,
        })
    }
}

#[async_trait]
impl Channel for TeamsChannel {
    fn type_name(&self) -> &str {
        "teams"
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
