use super::locks::{PhaseTracker, ServiceLocks};
use super::Orchestrator;
use crate::catalog::{default_catalog, load_catalog_file};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::events::EventBroadcaster;
use crate::healthcheck::{HealthProbe, HttpProbe};
use crate::runtime::{DockerGateway, RuntimeGateway};
use crate::state::Store;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Builder for an [`Orchestrator`].
///
/// Anything not supplied is derived from [`Settings`]: the store is opened
/// at `settings.database`, the runtime is the local Docker daemon, and the
/// health probe targets `settings.probe_host`. `build()` initializes the
/// schema and seeds an empty catalog.
///
/// ```no_run
/// use tool_orchestrator::{Orchestrator, Settings};
///
/// # async fn example() -> tool_orchestrator::Result<()> {
/// let orchestrator = Orchestrator::builder()
///     .settings(Settings::from_env()?)
///     .build()
///     .await?;
/// let services = orchestrator.list_services().await?;
/// # Ok(())
/// # }
/// ```
pub struct OrchestratorBuilder {
    settings: Settings,
    store: Option<Store>,
    runtime: Option<Arc<dyn RuntimeGateway>>,
    health: Option<Arc<dyn HealthProbe>>,
    events: Option<EventBroadcaster>,
    seed: Option<bool>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            store: None,
            runtime: None,
            health: None,
            events: None,
            seed: None,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn database(mut self, path: PathBuf) -> Self {
        self.settings.database = path;
        self
    }

    /// Use an already opened store instead of opening `settings.database`.
    pub fn store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    pub fn runtime(mut self, runtime: Arc<dyn RuntimeGateway>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn health_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.health = Some(probe);
        self
    }

    pub fn events(mut self, events: EventBroadcaster) -> Self {
        self.events = Some(events);
        self
    }

    pub fn restart_settle(mut self, settle: Duration) -> Self {
        self.settings.timeouts.restart_settle = settle;
        self
    }

    /// Override `settings.seed_catalog`.
    pub fn seed_catalog(mut self, seed: bool) -> Self {
        self.seed = Some(seed);
        self
    }

    pub async fn build(self) -> Result<Orchestrator> {
        let settings = self.settings;

        let store = match self.store {
            Some(store) => store,
            None => Store::open(&settings.database).await?,
        };
        store.initialize().await?;

        if self.seed.unwrap_or(settings.seed_catalog) {
            let catalog = match &settings.catalog_file {
                Some(path) => load_catalog_file(path)?,
                None => default_catalog(),
            };
            store.seed_if_empty(catalog).await?;
        }

        let runtime: Arc<dyn RuntimeGateway> = match self.runtime {
            Some(runtime) => runtime,
            None => Arc::new(
                DockerGateway::new(settings.docker_socket.clone(), settings.timeouts)
                    .map_err(|e| Error::Config(format!("Docker runtime: {}", e)))?,
            ),
        };

        let health: Arc<dyn HealthProbe> = match self.health {
            Some(health) => health,
            None => Arc::new(HttpProbe::new(
                settings.probe_host.clone(),
                settings.timeouts.control,
            )?),
        };

        let events = self
            .events
            .unwrap_or_else(|| EventBroadcaster::new(settings.timeouts.broadcast));

        debug!("Orchestrator ready (store at {})", store.path().display());
        Ok(Orchestrator {
            store,
            runtime,
            health,
            events,
            locks: ServiceLocks::new(),
            phases: PhaseTracker::new(),
            restart_settle: settings.timeouts.restart_settle,
            shutdown: CancellationToken::new(),
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
