//! Fan-out of one alert message to every enabled channel

use std::fmt;
use std::sync::Arc;

use crate::channel::{build_channel, Channel};
use crate::config::ChannelEndpoints;
use crate::io::HttpClient;

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
}

/// A channel that failed to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub channel: String,
    pub error: String,
}

/// Every channel failure for one message, in attempt order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    failures: Vec<ChannelFailure>,
    attempted: usize,
}

impl DispatchError {
    pub fn failures(&self) -> &[ChannelFailure] {
        &self.failures
    }

    /// Failure text for a given channel, if it failed
    pub fn error_for(&self, channel: &str) -> Option<&str> {
        self.failures
            .iter()
            .find(|f| f.channel == channel)
            .map(|f| f.error.as_str())
    }

    /// The last failure observed, used as the representative reason
    pub fn last(&self) -> &ChannelFailure {
        // never empty: only built by DispatchReport::into_result with failures
        &self.failures[self.failures.len() - 1]
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.last();
        write!(
            f,
            "{} of {} channel(s) failed, last error from {}: {}",
            self.failures.len(),
            self.attempted,
            last.channel,
            last.error
        )
    }
}

impl std::error::Error for DispatchError {}

/// Per-channel outcomes for one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// True when at least one channel accepted the message
    pub fn delivered(&self) -> bool {
        self.outcomes.iter().any(|o| o.success)
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    /// Reduce to a single result: failure if any enabled channel failed
    pub fn into_result(self) -> Result<(), DispatchError> {
        let attempted = self.outcomes.len();
        let failures: Vec<ChannelFailure> = self
            .outcomes
            .into_iter()
            .filter(|o| !o.success)
            .map(|o| ChannelFailure {
                channel: o.channel,
                error: o.error.unwrap_or_default(),
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                failures,
                attempted,
            })
        }
    }
}

/// Ordered registry of enabled channels
#[derive(Debug, Default, Clone)]
pub struct Dispatcher {
    channels: Vec<Arc<dyn Channel>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for every non-empty endpoint, in built-in order
    pub fn from_endpoints(endpoints: &ChannelEndpoints, http: Arc<dyn HttpClient>) -> Self {
        let mut dispatcher = Self::new();
        for (kind, url) in endpoints.enabled() {
            dispatcher.register(build_channel(kind, url, Arc::clone(&http)));
        }
        dispatcher
    }

    /// Add a channel. A channel with the same type name is replaced in place.
    pub fn register(&mut self, channel: Arc<dyn Channel>) {
        if let Some(existing) = self
            .channels
            .iter_mut()
            .find(|c| c.type_name() == channel.type_name())
        {
            *existing = channel;
        } else {
            self.channels.push(channel);
        }
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.type_name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Send `message` through every registered channel, one after another.
    /// A failing channel never stops the remaining ones.
    pub async fn dispatch(&self, message: &str) -> DispatchReport {
        let mut report = DispatchReport::default();

        for channel in &self.channels {
            tracing::debug!("Dispatching to '{}': {}", channel.type_name(), message);

            let result = channel.notify(message).await;
            if let Err(e) = &result {
                tracing::warn!("Notification via '{}' failed: {}", channel.type_name(), e);
            }

            report.outcomes.push(DispatchOutcome {
                channel: channel.type_name().to_string(),
                success: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            });
        }

        report
    }
}
