//! Container runtime gateway.
//!
//! The orchestrator talks to the container engine only through
//! [`RuntimeGateway`]; containers are addressed by service id and named
//! `orch_<service id>`.

mod docker;
mod stats;

pub use docker::DockerGateway;
pub use stats::{compute_stats, ContainerStats, StatsSample};

use crate::catalog::{PortMapping, ServiceDefinition, VolumeMapping};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Prefix joining service ids to physical container names.
pub const CONTAINER_PREFIX: &str = "orch_";

/// Physical container name for a service.
pub fn container_name(service_id: &str) -> String {
    format!("{}{}", CONTAINER_PREFIX, service_id)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The engine could not be reached at all.
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),

    /// The engine answered with an error (pull failure, port conflict, name collision, ...).
    #[error("container runtime error: {0}")]
    Api(String),

    #[error("no such container: {0}")]
    NotFound(String),
}

/// Everything needed to create a service's container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub service_id: String,
    /// `name:tag`
    pub image: String,
    pub ports: Vec<PortMapping>,
    pub env: BTreeMap<String, String>,
    pub volumes: Vec<VolumeMapping>,
}

impl ContainerSpec {
    pub fn from_definition(def: &ServiceDefinition) -> Self {
        Self {
            service_id: def.id.clone(),
            image: def.image_ref(),
            ports: def.port_mappings(),
            env: def.env.clone(),
            volumes: def.volume_mappings(),
        }
    }

    pub fn container_name(&self) -> String {
        container_name(&self.service_id)
    }
}

/// A container as seen by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerHandle {
    pub id: String,
    /// Raw runtime state (`running`, `exited`, ...)
    pub status: String,
}

#[async_trait]
pub trait RuntimeGateway: Send + Sync {
    /// Create and start the container for `spec`.
    async fn start(&self, spec: &ContainerSpec) -> Result<ContainerHandle, RuntimeError>;

    async fn stop(&self, service_id: &str) -> Result<(), RuntimeError>;

    /// Current container state. Never mutates anything.
    async fn status(&self, service_id: &str) -> Result<ContainerHandle, RuntimeError>;

    async fn logs(&self, service_id: &str, tail: usize) -> Result<String, RuntimeError>;

    /// One raw counters sample.
    async fn stats_sample(&self, service_id: &str) -> Result<StatsSample, RuntimeError>;

    /// Resource usage. Absent containers and runtime errors read as zeros.
    async fn stats(&self, service_id: &str) -> ContainerStats {
        match self.stats_sample(service_id).await {
            Ok(sample) => compute_stats(&sample),
            Err(e) => {
                warn!("Stats unavailable for {}: {}", service_id, e);
                ContainerStats::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_name_is_prefixed_service_id() {
        assert_eq!(container_name("code-server"), "orch_code-server");
    }

    #[test]
    fn spec_carries_parsed_mappings() {
        let def = crate::catalog::default_catalog()
            .into_iter()
            .find(|s| s.id == "rclone")
            .unwrap();
        let spec = ContainerSpec::from_definition(&def);
        assert_eq!(spec.image, "rclone/rclone:latest");
        assert_eq!(spec.ports.len(), 1);
        assert_eq!(spec.volumes.len(), 2);
        assert_eq!(spec.container_name(), "orch_rclone");
    }
}
