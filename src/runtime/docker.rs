use super::{
    container_name, ContainerHandle, ContainerSpec, RuntimeError, RuntimeGateway, StatsSample,
};
use crate::config::Timeouts;
use crate::docker::{DockerClient, DockerError, EngineClient, RawStats, RunOptions};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, error, info};

pub const MANAGED_LABEL: &str = "io.tool-orchestrator.managed";
pub const SERVICE_LABEL: &str = "io.tool-orchestrator.service";

/// [`RuntimeGateway`] backed by the local Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerGateway {
    client: DockerClient,
    engine: EngineClient,
    timeouts: Timeouts,
}

impl DockerGateway {
    pub fn new(socket: impl Into<PathBuf>, timeouts: Timeouts) -> Result<Self, DockerError> {
        Ok(Self {
            client: DockerClient::new(),
            engine: EngineClient::new(socket)?,
            timeouts,
        })
    }

    pub fn with_client(mut self, client: DockerClient) -> Self {
        self.client = client;
        self
    }

    fn run_options(spec: &ContainerSpec) -> RunOptions {
        RunOptions {
            name: spec.container_name(),
            image: spec.image.clone(),
            network: Some("bridge".to_string()),
            labels: vec![
                (MANAGED_LABEL.to_string(), "true".to_string()),
                (SERVICE_LABEL.to_string(), spec.service_id.clone()),
            ],
            publish: spec
                .ports
                .iter()
                .map(|p| format!("{}:{}", p.host_port, p.container_port))
                .collect(),
            env: spec
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            mounts: spec.volumes.iter().map(|v| v.bind_spec()).collect(),
        }
    }
}

impl From<DockerError> for RuntimeError {
    fn from(err: DockerError) -> Self {
        match err {
            e if e.is_unavailable() => RuntimeError::Unavailable(e.to_string()),
            DockerError::ContainerNotFound { container } => RuntimeError::NotFound(container),
            e => RuntimeError::Api(e.to_string()),
        }
    }
}

impl From<RawStats> for StatsSample {
    fn from(raw: RawStats) -> Self {
        StatsSample {
            cpu_total: raw.cpu_stats.cpu_usage.total_usage,
            precpu_total: raw.precpu_stats.cpu_usage.total_usage,
            system_cpu: raw.cpu_stats.system_cpu_usage,
            presystem_cpu: raw.precpu_stats.system_cpu_usage,
            memory_usage: raw.memory_stats.usage,
            memory_limit: raw.memory_stats.limit,
        }
    }
}

#[async_trait]
impl RuntimeGateway for DockerGateway {
    async fn start(&self, spec: &ContainerSpec) -> Result<ContainerHandle, RuntimeError> {
        let name = spec.container_name();

        // A stopped leftover from an earlier run would block the name; a running
        // container is refused by `docker rm` and surfaces as a conflict below.
        if let Err(e) = self.client.rm(&name, self.timeouts.control).await {
            if e.is_unavailable() {
                return Err(e.into());
            }
            debug!("Leaving existing container {} in place: {}", name, e);
        }

        let options = Self::run_options(spec);
        let id = match self.client.run_detached(&options, self.timeouts.start).await {
            Ok(id) => id,
            // Pulling a large image may legitimately exceed the bound; that is
            // an engine-side failure, not an unreachable daemon.
            Err(DockerError::Timeout { command, timeout }) => {
                error!("{} timed out after {:?}", command, timeout);
                return Err(RuntimeError::Api(format!(
                    "starting {} timed out after {:?}",
                    name, timeout
                )));
            }
            Err(e) => {
                if !e.is_unavailable() {
                    error!("Failed to start {}: {}", name, e);
                }
                return Err(e.into());
            }
        };

        info!("Started container {} ({})", name, id);
        Ok(ContainerHandle {
            id,
            status: "running".to_string(),
        })
    }

    async fn stop(&self, service_id: &str) -> Result<(), RuntimeError> {
        let name = container_name(service_id);
        self.client.stop(&name, self.timeouts.control).await?;
        info!("Stopped container {}", name);
        Ok(())
    }

    async fn status(&self, service_id: &str) -> Result<ContainerHandle, RuntimeError> {
        let state = self
            .client
            .inspect(&container_name(service_id), self.timeouts.control)
            .await?;
        Ok(ContainerHandle {
            id: state.id,
            status: state.status,
        })
    }

    async fn logs(&self, service_id: &str, tail: usize) -> Result<String, RuntimeError> {
        let text = self
            .client
            .logs(&container_name(service_id), tail, self.timeouts.logs)
            .await?;
        Ok(text)
    }

    async fn stats_sample(&self, service_id: &str) -> Result<StatsSample, RuntimeError> {
        let raw = self
            .engine
            .stats(&container_name(service_id), self.timeouts.stats)
            .await?;
        Ok(raw.into())
    }
}
