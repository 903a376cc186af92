use super::locks::{PhaseTracker, ServiceLocks};
use super::status::{reconcile, LifecyclePhase, ResolvedStatus, ServiceDetail};
use super::OrchestratorBuilder;
use crate::catalog::{NewService, ServiceDefinition};
use crate::error::{Error, Result};
use crate::events::{EventBroadcaster, LifecycleEvent, Subscription};
use crate::healthcheck::{HealthProbe, HealthReport};
use crate::runtime::{ContainerHandle, ContainerSpec, ContainerStats, RuntimeError, RuntimeGateway};
use crate::state::{Layout, NewLayout, Store};
use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Default number of log lines returned when no tail is given.
pub const DEFAULT_LOG_TAIL: usize = 100;

/// Coordinates the catalog store, the container runtime and event fan-out.
///
/// Start, stop and restart for one service id are serialized; different
/// ids proceed independently. Ordering for every mutation: runtime call,
/// then the store write, then the event.
pub struct Orchestrator {
    pub(super) store: Store,
    pub(super) runtime: Arc<dyn RuntimeGateway>,
    pub(super) health: Arc<dyn HealthProbe>,
    pub(super) events: EventBroadcaster,
    pub(super) locks: ServiceLocks,
    pub(super) phases: PhaseTracker,
    pub(super) restart_settle: Duration,
    pub(super) shutdown: CancellationToken,
}

/// Translate a runtime failure for `service_id` into the crate error.
fn runtime_error(service_id: &str, err: RuntimeError) -> Error {
    match err {
        RuntimeError::Unavailable(msg) => Error::RuntimeUnavailable(msg),
        RuntimeError::Api(msg) => Error::RuntimeApi(msg),
        RuntimeError::NotFound(_) => Error::ContainerNotFound(service_id.to_string()),
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Cancelled by [`shutdown`](Self::shutdown); long-lived tasks watch it.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Every catalog entry with its resolved status, in catalog order.
    pub async fn list_services(&self) -> Result<Vec<ServiceDetail>> {
        let services = self.store.list_services().await?;
        try_join_all(services.into_iter().map(|service| async move {
            let container = self.resolved_status(&service.id).await?;
            Ok::<_, Error>(ServiceDetail { service, container })
        }))
        .await
    }

    /// One catalog entry with its resolved status.
    pub async fn service_detail(&self, service_id: &str) -> Result<ServiceDetail> {
        let service = self.get_service(service_id).await?;
        let container = self.resolved_status(service_id).await?;
        Ok(ServiceDetail { service, container })
    }

    pub async fn get_service(&self, service_id: &str) -> Result<ServiceDefinition> {
        self.store
            .get_service(service_id)
            .await?
            .ok_or_else(|| Error::ServiceNotFound(service_id.to_string()))
    }

    /// Add a catalog entry; the id is derived from the name.
    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_service(&self, new: NewService) -> Result<ServiceDefinition> {
        let def = new.into_definition()?;
        self.store.insert_service(&def).await?;
        info!("Created service {}", def.id);
        Ok(def)
    }

    /// Import definitions, skipping ids that already exist. Returns the ids added.
    pub async fn import_services(&self, defs: Vec<ServiceDefinition>) -> Result<Vec<String>> {
        let mut added = Vec::new();
        for def in defs {
            match self.store.insert_service(&def).await {
                Ok(()) => added.push(def.id),
                Err(Error::Conflict(_)) => info!("Skipping {}: already in catalog", def.id),
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }

    /// Remove a catalog entry and its lifecycle record. Any container is left running.
    #[tracing::instrument(skip(self))]
    pub async fn delete_service(&self, service_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(service_id).await;
        if !self.store.delete_service(service_id).await? {
            return Err(Error::ServiceNotFound(service_id.to_string()));
        }
        self.phases.clear(service_id);
        info!("Deleted service {}", service_id);
        Ok(())
    }

    /// Toggle the enabled flag. Touches no container.
    #[tracing::instrument(skip(self))]
    pub async fn set_service_enabled(&self, service_id: &str, enabled: bool) -> Result<()> {
        if !self.store.set_service_enabled(service_id, enabled).await? {
            return Err(Error::ServiceNotFound(service_id.to_string()));
        }
        info!(
            "Service {} {}",
            service_id,
            if enabled { "enabled" } else { "disabled" }
        );
        self.events.publish(LifecycleEvent::ServiceEnabledChanged {
            service_id: service_id.to_string(),
            enabled,
        });
        Ok(())
    }

    // ========================================================================
    // Container lifecycle
    // ========================================================================

    /// Create and start the service's container. Does not check for an
    /// existing container; the runtime rejects a duplicate name.
    #[tracing::instrument(skip(self))]
    pub async fn start_container(&self, service_id: &str) -> Result<ContainerHandle> {
        let _guard = self.locks.acquire(service_id).await;
        self.start_locked(service_id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn stop_container(&self, service_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(service_id).await;
        self.stop_locked(service_id).await
    }

    /// Stop, wait for the settle delay, start. Requires an existing container.
    #[tracing::instrument(skip(self))]
    pub async fn restart_container(&self, service_id: &str) -> Result<ContainerHandle> {
        let _guard = self.locks.acquire(service_id).await;
        self.stop_locked(service_id).await?;
        tokio::time::sleep(self.restart_settle).await;
        self.start_locked(service_id).await
    }

    async fn start_locked(&self, service_id: &str) -> Result<ContainerHandle> {
        let def = self.get_service(service_id).await?;
        let spec = ContainerSpec::from_definition(&def);

        self.phases.transition(service_id, LifecyclePhase::Starting);
        let handle = match self.runtime.start(&spec).await {
            Ok(handle) => handle,
            Err(e) => {
                self.phases.transition(service_id, LifecyclePhase::Unknown);
                if let RuntimeError::Api(detail) = &e {
                    error!("Runtime rejected start of {}: {}", service_id, detail);
                }
                return Err(runtime_error(service_id, e));
            }
        };

        // The container runs whether or not the record lands.
        let recorded = self
            .store
            .record_started(service_id, &handle.id, Utc::now())
            .await;
        self.phases.transition(service_id, LifecyclePhase::Running);
        match recorded {
            Ok(true) => {}
            Ok(false) => warn!("{} vanished from the catalog while starting", service_id),
            Err(e) => {
                error!("Started {} ({}) but could not record it: {}", service_id, handle.id, e);
                return Err(e);
            }
        }

        info!("Started {} ({})", service_id, handle.id);
        self.events.publish(LifecycleEvent::ContainerStarted {
            service_id: service_id.to_string(),
            container_id: handle.id.clone(),
        });
        Ok(handle)
    }

    async fn stop_locked(&self, service_id: &str) -> Result<()> {
        self.phases.transition(service_id, LifecyclePhase::Stopping);
        if let Err(e) = self.runtime.stop(service_id).await {
            let phase = match e {
                RuntimeError::NotFound(_) => LifecyclePhase::Stopped,
                _ => LifecyclePhase::Unknown,
            };
            self.phases.transition(service_id, phase);
            return Err(runtime_error(service_id, e));
        }

        let recorded = self.store.record_stopped(service_id, Utc::now()).await;
        self.phases.transition(service_id, LifecyclePhase::Stopped);
        if let Err(e) = recorded {
            error!("Stopped {} but could not record it: {}", service_id, e);
            return Err(e);
        }

        info!("Stopped {}", service_id);
        self.events.publish(LifecycleEvent::ContainerStopped {
            service_id: service_id.to_string(),
        });
        Ok(())
    }

    /// Status merged from the runtime (preferred) and the lifecycle record.
    pub async fn resolved_status(&self, service_id: &str) -> Result<ResolvedStatus> {
        let probe = self.runtime.status(service_id).await;
        if let Err(RuntimeError::Unavailable(detail)) = &probe {
            warn!("Runtime unavailable while resolving {}: {}", service_id, detail);
        }
        let record = self.store.get_record(service_id).await?;
        let phase = self.phases.get(service_id);
        Ok(reconcile(service_id, &probe, record.as_ref(), phase))
    }

    pub async fn logs(&self, service_id: &str, tail: usize) -> Result<String> {
        self.runtime
            .logs(service_id, tail)
            .await
            .map_err(|e| runtime_error(service_id, e))
    }

    /// Resource usage; zeros when nothing can be measured.
    pub async fn stats(&self, service_id: &str) -> ContainerStats {
        self.runtime.stats(service_id).await
    }

    pub async fn check_health(&self, service_id: &str) -> Result<HealthReport> {
        let def = self.get_service(service_id).await?;
        Ok(self.health.probe(&def).await)
    }

    // ========================================================================
    // Layouts
    // ========================================================================

    pub async fn list_layouts(&self) -> Result<Vec<Layout>> {
        self.store.list_layouts().await
    }

    pub async fn create_layout(&self, new: NewLayout) -> Result<Layout> {
        self.store.create_layout(new).await
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn unsubscribe(&self, subscription_id: u64) {
        self.events.unsubscribe(subscription_id)
    }

    /// Stop accepting work: cancel watchers, end event streams, close the store.
    pub async fn shutdown(&self) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Ok(());
        }
        self.shutdown.cancel();
        self.events.shutdown();
        self.store.clone().close().await?;
        info!("Orchestrator shut down");
        Ok(())
    }
}
