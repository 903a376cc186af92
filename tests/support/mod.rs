#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tool_orchestrator::catalog::ServiceDefinition;
use tool_orchestrator::healthcheck::{HealthProbe, HealthReport, HealthState};
use tool_orchestrator::runtime::{
    container_name, ContainerHandle, ContainerSpec, RuntimeError, RuntimeGateway, StatsSample,
};
use tool_orchestrator::{EventBroadcaster, Orchestrator, Store};

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub running: bool,
    pub spec: ContainerSpec,
}

/// In-memory container engine.
///
/// Mirrors the daemon's observable behavior: a running container blocks its
/// name, a stopped one is replaced on the next start, stop keeps the
/// container around in `exited` state.
#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<HashMap<String, FakeContainer>>,
    unavailable: AtomicBool,
    next_id: AtomicUsize,
    start_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    start_calls: AtomicUsize,
}

impl FakeRuntime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_start_delay(&self, delay: Duration) {
        *self.start_delay.lock() = delay;
    }

    pub fn container(&self, service_id: &str) -> Option<FakeContainer> {
        self.containers.lock().get(service_id).cloned()
    }

    /// Simulate a container dying outside the orchestrator's control.
    pub fn kill(&self, service_id: &str) {
        if let Some(c) = self.containers.lock().get_mut(service_id) {
            c.running = false;
        }
    }

    /// Simulate an operator removing the container by hand.
    pub fn remove(&self, service_id: &str) {
        self.containers.lock().remove(service_id);
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), RuntimeError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RuntimeError::Unavailable(
                "Cannot connect to the Docker daemon".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RuntimeGateway for FakeRuntime {
    async fn start(&self, spec: &ContainerSpec) -> Result<ContainerHandle, RuntimeError> {
        self.check_available()?;
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.start_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut containers = self.containers.lock();
        if let Some(existing) = containers.get(&spec.service_id) {
            if existing.running {
                return Err(RuntimeError::Api(format!(
                    "Conflict. The container name \"/{}\" is already in use",
                    spec.container_name()
                )));
            }
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("{:064x}", n + 1);
        containers.insert(
            spec.service_id.clone(),
            FakeContainer {
                id: id.clone(),
                running: true,
                spec: spec.clone(),
            },
        );
        Ok(ContainerHandle {
            id,
            status: "running".to_string(),
        })
    }

    async fn stop(&self, service_id: &str) -> Result<(), RuntimeError> {
        self.check_available()?;
        match self.containers.lock().get_mut(service_id) {
            Some(c) => {
                c.running = false;
                Ok(())
            }
            None => Err(RuntimeError::NotFound(container_name(service_id))),
        }
    }

    async fn status(&self, service_id: &str) -> Result<ContainerHandle, RuntimeError> {
        self.check_available()?;
        self.containers
            .lock()
            .get(service_id)
            .map(|c| ContainerHandle {
                id: c.id.clone(),
                status: if c.running { "running" } else { "exited" }.to_string(),
            })
            .ok_or_else(|| RuntimeError::NotFound(container_name(service_id)))
    }

    async fn logs(&self, service_id: &str, tail: usize) -> Result<String, RuntimeError> {
        self.check_available()?;
        if !self.containers.lock().contains_key(service_id) {
            return Err(RuntimeError::NotFound(container_name(service_id)));
        }
        let lines: Vec<String> = (1..=200).map(|i| format!("line {}", i)).collect();
        let start = lines.len().saturating_sub(tail);
        Ok(lines[start..].join("\n"))
    }

    async fn stats_sample(&self, service_id: &str) -> Result<StatsSample, RuntimeError> {
        self.check_available()?;
        match self.containers.lock().get(service_id) {
            Some(c) if c.running => Ok(StatsSample {
                cpu_total: 120,
                precpu_total: 100,
                system_cpu: 1100,
                presystem_cpu: 1000,
                memory_usage: 104_857_600,
                memory_limit: 1_073_741_824,
            }),
            _ => Err(RuntimeError::NotFound(container_name(service_id))),
        }
    }
}

/// Health probe that reports every service with a health path as healthy.
pub struct FakeProbe;

#[async_trait]
impl HealthProbe for FakeProbe {
    async fn probe(&self, service: &ServiceDefinition) -> HealthReport {
        match &service.health_check {
            Some(path) => HealthReport {
                service_id: service.id.clone(),
                state: HealthState::Healthy,
                url: Some(format!("http://fake{}", path)),
                status_code: Some(200),
                detail: None,
            },
            None => HealthReport::unsupported(&service.id, "no health check configured"),
        }
    }
}

/// Orchestrator over an in-memory store seeded with the built-in catalog.
pub async fn orchestrator_with(runtime: Arc<FakeRuntime>) -> Orchestrator {
    orchestrator_with_events(runtime, EventBroadcaster::new(Duration::from_millis(200))).await
}

pub async fn orchestrator_with_events(
    runtime: Arc<FakeRuntime>,
    events: EventBroadcaster,
) -> Orchestrator {
    let store = Store::open_ephemeral().await.unwrap();
    orchestrator_with_store(runtime, store, events).await
}

/// Orchestrator over a caller-supplied store (e.g. an on-disk database).
pub async fn orchestrator_with_store(
    runtime: Arc<FakeRuntime>,
    store: Store,
    events: EventBroadcaster,
) -> Orchestrator {
    Orchestrator::builder()
        .store(store)
        .runtime(runtime)
        .health_probe(Arc::new(FakeProbe))
        .events(events)
        .seed_catalog(true)
        .restart_settle(Duration::from_millis(10))
        .build()
        .await
        .unwrap()
}
