mod catalog;
mod layouts;
mod lifecycle;
mod serve;
mod services;

pub use catalog::run_catalog;
pub use layouts::run_layouts;
pub use lifecycle::{run_health, run_logs, run_restart, run_start, run_stats, run_status, run_stop};
pub use serve::run_serve;
pub use services::run_services;

#[cfg(test)]
pub(crate) async fn test_orchestrator() -> tool_orchestrator::Orchestrator {
    tool_orchestrator::Orchestrator::builder()
        .store(tool_orchestrator::Store::open_ephemeral().await.unwrap())
        .seed_catalog(true)
        .build()
        .await
        .unwrap()
}
