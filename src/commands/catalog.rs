use crate::cli::CatalogCommands;
use crate::output::UserOutput;
use tool_orchestrator::catalog::load_catalog_file;
use tool_orchestrator::Orchestrator;

pub async fn run_catalog(
    orchestrator: &Orchestrator,
    cmd: CatalogCommands,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    match cmd {
        CatalogCommands::Import { file } => {
            let defs = load_catalog_file(&file)?;
            let total = defs.len();
            let added = orchestrator.import_services(defs).await?;
            if added.len() < total {
                out.warning(&format!(
                    "{} entr{} already present, skipped",
                    total - added.len(),
                    if total - added.len() == 1 { "y" } else { "ies" }
                ));
            }
            out.success(&format!("Imported {} service(s)", added.len()));
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
    async fn import_reports_added_and_skipped_entries() {
        let orchestrator = test_orchestrator().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("catalog.yaml");
        std::fs::write(
            &file,
            "services:\n  - {id: whoami, name: Whoami, category: tool, image: traefik/whoami}\n  - {id: grist, name: Grist, category: data, image: gristlabs/grist}\n",
        )
        .unwrap();

        let out = CaptureOutput::default();
        run_catalog(&orchestrator, CatalogCommands::Import { file }, &out)
            .await
            .unwrap();

        assert_eq!(out.lines("success"), vec!["Imported 1 service(s)"]);
        assert_eq!(out.lines("warning"), vec!["1 entry already present, skipped"]);
        assert!(orchestrator.get_service("whoami").await.is_ok());
    }
}
