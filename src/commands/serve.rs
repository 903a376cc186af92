use std::sync::Arc;
use tool_orchestrator::docker::DockerClient;
use tool_orchestrator::{api, Orchestrator, Settings};
use tracing::{info, warn};

pub async fn run_serve(orchestrator: Arc<Orchestrator>, settings: &Settings) -> anyhow::Result<()> {
    if !DockerClient::new()
        .daemon_healthy(settings.timeouts.control)
        .await
    {
        warn!("Docker daemon not reachable; container operations will report the runtime as unavailable");
    }

    let signal_target = orchestrator.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, shutting down");
            if let Err(e) = signal_target.shutdown().await {
                warn!("Shutdown failed: {}", e);
            }
        }
    });

    api::serve(orchestrator, settings.bind).await?;
    Ok(())
}
