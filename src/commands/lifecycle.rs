use crate::output::UserOutput;
use tool_orchestrator::healthcheck::HealthState;
use tool_orchestrator::Orchestrator;

pub async fn run_start(
    orchestrator: &Orchestrator,
    service: &str,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    out.status(&format!("Starting {}...", service));
    let handle = orchestrator.start_container(service).await?;
    out.success(&format!("Started {} ({})", service, handle.id));
    Ok(())
}

pub async fn run_stop(
    orchestrator: &Orchestrator,
    service: &str,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    orchestrator.stop_container(service).await?;
    out.success(&format!("Stopped {}", service));
    Ok(())
}

pub async fn run_restart(
    orchestrator: &Orchestrator,
    service: &str,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    out.status(&format!("Restarting {}...", service));
    let handle = orchestrator.restart_container(service).await?;
    out.success(&format!("Restarted {} ({})", service, handle.id));
    Ok(())
}

pub async fn run_status(
    orchestrator: &Orchestrator,
    service: Option<&str>,
    json: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let statuses = match service {
        Some(id) => vec![orchestrator.resolved_status(id).await?],
        None => orchestrator
            .list_services()
            .await?
            .into_iter()
            .map(|detail| detail.container)
            .collect(),
    };

    if json {
        out.data(&serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    for status in &statuses {
        let container = status
            .container_id
            .as_deref()
            .map(|id| &id[..id.len().min(12)])
            .unwrap_or("-");
        let line = format!(
            "{:<20} {:<8} {}",
            status.service_id,
            status.status.as_str(),
            container
        );
        match status.phase {
            Some(phase) if phase.is_transitional() => {
                out.status(&format!("{} ({})", line, phase))
            }
            _ => out.status(&line),
        }
    }
    Ok(())
}

pub async fn run_logs(
    orchestrator: &Orchestrator,
    service: &str,
    tail: usize,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let logs = orchestrator.logs(service, tail).await?;
    out.data(logs.trim_end());
    Ok(())
}

pub async fn run_stats(
    orchestrator: &Orchestrator,
    service: &str,
    json: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let stats = orchestrator.stats(service).await;
    if json {
        out.data(&serde_json::to_string_pretty(&stats)?);
    } else {
        out.status(&format!(
            "{}: cpu {:.2}%  mem {:.2} MB ({:.2}%)",
            service, stats.cpu_percent, stats.memory_usage_mb, stats.memory_percent
        ));
    }
    Ok(())
}

pub async fn run_health(
    orchestrator: &Orchestrator,
    service: &str,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let report = orchestrator.check_health(service).await?;
    let target = report.url.as_deref().unwrap_or("-");
    match report.state {
        HealthState::Healthy => out.success(&format!("{} healthy ({})", service, target)),
        HealthState::Unhealthy => out.warning(&format!(
            "{} unhealthy ({}): {}",
            service,
            target,
            report.detail.as_deref().unwrap_or("no detail")
        )),
        HealthState::Unsupported => out.status(&format!(
            "{}: {}",
            service,
            report.detail.as_deref().unwrap_or("no health check")
        )),
    }
    Ok(())
}
