use crate::cli::ServicesCommands;
use crate::output::UserOutput;
use anyhow::Context;
use tool_orchestrator::{NewService, Orchestrator};

pub async fn run_services(
    orchestrator: &Orchestrator,
    cmd: ServicesCommands,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    match cmd {
        ServicesCommands::List { json } => {
            let services = orchestrator.list_services().await?;
            if json {
                out.data(&serde_json::to_string_pretty(&services)?);
                return Ok(());
            }
            if services.is_empty() {
                out.status("Catalog is empty");
                return Ok(());
            }
            for detail in &services {
                let svc = &detail.service;
                out.status(&format!(
                    "{:<20} {:<12} {:<40} {:<9} {}",
                    svc.id,
                    svc.category,
                    svc.image_ref(),
                    if svc.enabled { "enabled" } else { "disabled" },
                    detail.container.status.as_str()
                ));
            }
        }
        ServicesCommands::Show { service } => {
            let detail = orchestrator.service_detail(&service).await?;
            out.data(&serde_json::to_string_pretty(&detail)?);
        }
        ServicesCommands::Create { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let new: NewService = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid service definition", file.display()))?;
            let def = orchestrator.create_service(new).await?;
            out.success(&format!("Created service {}", def.id));
        }
        ServicesCommands::Delete { service } => {
            orchestrator.delete_service(&service).await?;
            out.success(&format!("Deleted service {}", service));
        }
        ServicesCommands::Enable { service } => {
            orchestrator.set_service_enabled(&service, true).await?;
            out.success(&format!("Enabled {}", service));
        }
        ServicesCommands::Disable { service } => {
            orchestrator.set_service_enabled(&service, false).await?;
            out.success(&format!("Disabled {}", service));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_orchestrator;
    use crate::output::CaptureOutput;

    #[tokio::test]
    async fn list_prints_status_column() {
        let orchestrator = test_orchestrator().await;
        let out = CaptureOutput::default();

        run_services(&orchestrator, ServicesCommands::List { json: true }, &out)
            .await
            .unwrap();

        let payload: serde_json::Value = serde_json::from_str(&out.lines("data")[0]).unwrap();
        let entries = payload.as_array().unwrap();
        assert_eq!(entries.len(), 20);
        assert!(entries.iter().all(|e| e["status"].is_string()));
    }

    #[tokio::test]
    async fn enable_unknown_service_fails() {
        let orchestrator = test_orchestrator().await;
        let out = CaptureOutput::default();

        let cmd = ServicesCommands::Enable {
            service: "nope".to_string(),
        };
        let err = run_services(&orchestrator, cmd, &out).await.unwrap_err();

        assert!(err.to_string().contains("nope"));
        assert!(out.lines("success").is_empty());
    }
}
