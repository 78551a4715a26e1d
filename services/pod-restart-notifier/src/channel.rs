//! Channel trait for delivering alerts to chat webhooks

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ChannelKind;
use crate::discord::DiscordChannel;
use crate::io::HttpClient;
use crate::slack::SlackChannel;
use crate::teams::TeamsChannel;

/// Trait for sending an alert message to one outbound integration
#[async_trait]
pub trait Channel: Send + Sync + std::fmt::Debug {
    /// Get the channel type name (e.g. "slack")
    fn type_name(&self) -> &str;

    /// Deliver a message
    async fn notify(&self, message: &str) -> crate::Result<()>;
}

/// Build the adapter for a built-in channel kind
pub fn build_channel(
    kind: ChannelKind,
    webhook_url: &str,
    http: Arc<dyn HttpClient>,
) -> Arc<dyn Channel> {
    match kind {
        ChannelKind::Discord => Arc::new(DiscordChannel::new(webhook_url, http)),
        ChannelKind::Teams => Arc::new(TeamsChannel::new(webhook_url, http)),
        ChannelKind::Slack => Arc::new(SlackChannel::new(webhook_url, http)),
    }
}

/// POST `payload` to a webhook. Anything but status 200 is a failure.
pub(crate) async fn post_webhook(
    http: &dyn HttpClient,
    type_name: &str,
    webhook_url: &str,
    payload: &serde_json::Value,
) -> crate::Result<()> {
    tracing::debug!("Sending {} webhook notification", type_name);

    let response = http.post_json(webhook_url, payload).await?;

    if response.status != 200 {
        return Err(crate::NotifierError::Channel(format!(
            "{} webhook returned status {}: {}",
            type_name, response.status, response.body
        )));
    }

    tracing::debug!("{} notification sent successfully", type_name);
    Ok(())
}
