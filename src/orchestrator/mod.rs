mod builder;
mod core;
mod locks;
mod status;

pub use builder::OrchestratorBuilder;
pub use self::core::{Orchestrator, DEFAULT_LOG_TAIL};
pub use locks::{PhaseTracker, ServiceLocks};
pub use status::{reconcile, LifecyclePhase, ResolvedStatus, ServiceDetail};
