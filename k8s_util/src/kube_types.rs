use std::fmt;

use chrono::{DateTime, Utc};
use k8s_openapi::{
    api::core::v1::{Event, Pod},
    apimachinery::pkg::apis::meta::v1::Time,
};

pub const PHASE_RUNNING: &str = "Running";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodName {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for PodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

pub fn pod_phase(pod: &Pod) -> &str {
    pod.status
        .as_ref()
        .and_then(|status| status.phase.as_deref())
        .unwrap_or("Unknown")
}

pub fn pod_is_running(pod: &Pod) -> bool {
    pod_phase(pod) == PHASE_RUNNING
}

pub fn pod_restart_count(pod: &Pod) -> i32 {
    pod.status
        .iter()
        .flat_map(|status| status.container_statuses.iter().flatten())
        .map(|status| status.restart_count)
        .sum()
}

/// Waiting or terminated state of one container, as reported in pod status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerCondition {
    Waiting {
        container: String,
        reason: String,
        message: String,
    },
    Terminated {
        container: String,
        reason: String,
        message: String,
        exit_code: i32,
    },
}

impl fmt::Display for ContainerCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerCondition::Waiting {
                container,
                reason,
                message,
            } => write!(f, "Container {} is waiting: {} - {}", container, reason, message),
            ContainerCondition::Terminated {
                container,
                reason,
                message,
                exit_code,
            } => write!(
                f,
                "Container {} terminated: {} - {} (exit code: {})",
                container, reason, message, exit_code
            ),
        }
    }
}

pub fn container_conditions(pod: &Pod) -> Vec<ContainerCondition> {
    let mut out = Vec::new();
    let statuses = pod
        .status
        .iter()
        .flat_map(|status| status.container_statuses.iter().flatten());
    for status in statuses {
        let Some(state) = &status.state else {
            continue;
        };
        if let Some(waiting) = &state.waiting {
            out.push(ContainerCondition::Waiting {
                container: status.name.clone(),
                reason: waiting.reason.clone().unwrap_or_default(),
                message: waiting.message.clone().unwrap_or_default(),
            });
        }
        if let Some(terminated) = &state.terminated {
            out.push(ContainerCondition::Terminated {
                container: status.name.clone(),
                reason: terminated.reason.clone().unwrap_or_default(),
                message: terminated.message.clone().unwrap_or_default(),
                exit_code: terminated.exit_code,
            });
        }
    }
    out
}

/// One-line event summary printed while waiting on a pod.
pub fn event_line(event: &Event) -> String {
    format!(
        "Event: Type={} Reason={} Message={}",
        event.type_.as_deref().unwrap_or_default(),
        event.reason.as_deref().unwrap_or_default(),
        event.message.as_deref().unwrap_or_default()
    )
}

/// Age rounded to the minute, like `3d4h`, `2h5m` or `12m`.
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = ((now - since).num_seconds().max(0) + 30) / 60;
    let (days, hours, minutes) = (minutes / 1440, (minutes / 60) % 24, minutes % 60);
    match (days, hours) {
        (0, 0) => format!("{}m", minutes),
        (0, _) => format!("{}h{}m", hours, minutes),
        _ => format!("{}d{}h", days, hours),
    }
}

/// Age of a timestamp relative to now, empty when unset.
pub fn age(time: Option<&Time>) -> String {
    time.map(|time| format_age(time.0, Utc::now()))
        .unwrap_or_default()
}
