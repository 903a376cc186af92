use crate::cli::LayoutsCommands;
use crate::output::UserOutput;
use anyhow::Context;
use tool_orchestrator::state::NewLayout;
use tool_orchestrator::Orchestrator;

pub async fn run_layouts(
    orchestrator: &Orchestrator,
    cmd: LayoutsCommands,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    match cmd {
        LayoutsCommands::List => {
            let layouts = orchestrator.list_layouts().await?;
            if layouts.is_empty() {
                out.status("No saved layouts");
            }
            for layout in &layouts {
                out.status(&format!(
                    "{}  {}{}",
                    layout.id,
                    layout.name,
                    if layout.is_default { " (default)" } else { "" }
                ));
            }
        }
        LayoutsCommands::Create {
            name,
            data,
            default,
        } => {
            let layout_data = match data {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    serde_json::from_str(&raw)
                        .with_context(|| format!("{} is not valid JSON", path.display()))?
                }
                None => serde_json::Value::Array(Vec::new()),
            };
            let layout = orchestrator
                .create_layout(NewLayout {
                    name,
                    layout_data,
                    is_default: default,
                })
                .await?;
            out.success(&format!("Saved layout {} ({})", layout.name, layout.id));
        }
    }
    Ok(())
}
