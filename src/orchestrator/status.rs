use crate::catalog::ServiceDefinition;
use crate::runtime::{ContainerHandle, RuntimeError};
use crate::state::{CoarseStatus, LifecycleRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-service lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    Stopped,
    Starting,
    Running,
    Stopping,
    Unknown,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecyclePhase::Stopped => "stopped",
            LifecyclePhase::Starting => "starting",
            LifecyclePhase::Running => "running",
            LifecyclePhase::Stopping => "stopping",
            LifecyclePhase::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl LifecyclePhase {
    /// Valid transitions:
    /// ```text
    /// Stopped ──► Starting ──► Running ──► Stopping ──► Stopped
    ///                │                        │
    ///                └──► Stopped   Running ◄─┘ (stop failed)
    /// ```
    /// `Unknown` may be entered from anywhere and left toward either
    /// transitional phase.
    pub fn is_valid_transition(&self, to: LifecyclePhase) -> bool {
        use LifecyclePhase::*;
        match (self, to) {
            (_, Unknown) => true,
            (Stopped, Starting) => true,
            (Starting, Running) | (Starting, Stopped) => true,
            (Running, Stopping) => true,
            (Stopping, Stopped) | (Stopping, Running) => true,
            (Unknown, Starting) | (Unknown, Stopping) => true,
            _ => false,
        }
    }

    pub fn is_transitional(&self) -> bool {
        matches!(self, LifecyclePhase::Starting | LifecyclePhase::Stopping)
    }
}

/// Status of one service, merged from the runtime and the lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStatus {
    pub service_id: String,
    pub status: CoarseStatus,
    pub container_id: Option<String>,
    /// Raw runtime state when a container was found (`running`, `exited`, ...)
    pub runtime_state: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    /// Status as last written to the store
    pub recorded_status: Option<CoarseStatus>,
    /// Operation currently executing for this service, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<LifecyclePhase>,
}

/// A catalog entry with its resolved status merged in, flat on the wire
/// (`id`, `name`, ..., `status`, `container_id`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: ServiceDefinition,
    #[serde(flatten)]
    pub container: ResolvedStatus,
}

fn coarse_from_runtime(state: &str) -> CoarseStatus {
    match state {
        "running" | "restarting" => CoarseStatus::Running,
        _ => CoarseStatus::Stopped,
    }
}

/// Merge a runtime probe with the stored record.
///
/// The runtime decides whether a container runs. The record supplies
/// timestamps, and the last container id only when the runtime could not be
/// asked.
pub fn reconcile(
    service_id: &str,
    probe: &Result<ContainerHandle, RuntimeError>,
    record: Option<&LifecycleRecord>,
    phase: Option<LifecyclePhase>,
) -> ResolvedStatus {
    let (status, container_id, runtime_state) = match probe {
        Ok(handle) => (
            coarse_from_runtime(&handle.status),
            Some(handle.id.clone()),
            Some(handle.status.clone()),
        ),
        Err(RuntimeError::NotFound(_)) => (CoarseStatus::Stopped, None, None),
        Err(_) => (
            CoarseStatus::Unknown,
            record.and_then(|r| r.container_id.clone()),
            None,
        ),
    };

    ResolvedStatus {
        service_id: service_id.to_string(),
        status,
        container_id,
        runtime_state,
        started_at: record.and_then(|r| r.started_at),
        stopped_at: record.and_then(|r| r.stopped_at),
        recorded_status: record.map(|r| r.status),
        phase: phase.filter(LifecyclePhase::is_transitional),
    }
}
