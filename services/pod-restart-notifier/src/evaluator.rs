//! Threshold evaluation of restart observations

use crate::pods::ContainerRestartObservation;

/// A qualifying observation together with the message sent for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub message: String,
    pub observation: ContainerRestartObservation,
}

/// Human readable alert text for an observation
pub fn format_message(observation: &ContainerRestartObservation) -> String {
    format!(
        "Pod {} has restarted {} times",
        observation.pod_name, observation.restart_count
    )
}

/// Select every observation whose restart count is at or above `min_restarts`.
///
/// A threshold of 0 is treated as 1. Input order is kept and nothing is
/// deduplicated.
pub fn evaluate(
    observations: &[ContainerRestartObservation],
    min_restarts: u32,
) -> Vec<NotificationEvent> {
    let threshold = min_restarts.max(1);
    observations
        .iter()
        .filter(|o| o.restart_count >= threshold)
        .map(|o| NotificationEvent {
            message: format_message(o),
            observation: o.clone(),
        })
        .collect()
}
