//! Lifecycle events and their fan-out to live subscribers.

mod broadcaster;

pub use broadcaster::{EventBroadcaster, Subscription, DEFAULT_SUBSCRIBER_CAPACITY};

use serde::{Deserialize, Serialize};

/// Something a client watching the dashboard should know about.
///
/// Serialized as one JSON object tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    #[serde(rename = "service_updated")]
    ServiceEnabledChanged { service_id: String, enabled: bool },
    ContainerStarted {
        service_id: String,
        container_id: String,
    },
    ContainerStopped { service_id: String },
}

impl LifecycleEvent {
    pub fn service_id(&self) -> &str {
        match self {
            LifecycleEvent::ServiceEnabledChanged { service_id, .. }
            | LifecycleEvent::ContainerStarted { service_id, .. }
            | LifecycleEvent::ContainerStopped { service_id } => service_id,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
