use super::status::LifecyclePhase;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

/// One async mutex per service id, created on first use.
///
/// The map's own lock is held only for the lookup; entries are never removed.
#[derive(Default)]
pub struct ServiceLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ServiceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, service_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(service_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// In-memory lifecycle phase per service.
#[derive(Default)]
pub struct PhaseTracker {
    phases: Mutex<HashMap<String, LifecyclePhase>>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, service_id: &str) -> Option<LifecyclePhase> {
        self.phases.lock().get(service_id).copied()
    }

    /// Move `service_id` to `to`. Unexpected transitions are logged, never
    /// refused: the runtime has the final word.
    pub fn transition(&self, service_id: &str, to: LifecyclePhase) {
        let mut phases = self.phases.lock();
        let from = phases
            .get(service_id)
            .copied()
            .unwrap_or(LifecyclePhase::Stopped);
        if from != to && !from.is_valid_transition(to) {
            warn!("{}: unexpected transition {} -> {}", service_id, from, to);
        } else {
            debug!("{}: {} -> {}", service_id, from, to);
        }
        phases.insert(service_id.to_string(), to);
    }

    /// Forget a service's phase (e.g. after deletion).
    pub fn clear(&self, service_id: &str) {
        self.phases.lock().remove(service_id);
    }
}
