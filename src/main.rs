mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use tool_orchestrator::{Error as OrchError, Orchestrator, Settings};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(orch_error) = e.downcast_ref::<OrchError>() {
            eprintln!("Error: {}", orch_error.with_suggestion());
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let mut settings = Settings::from_env()?;
    if let Some(database) = cli.database.clone() {
        settings.database = database;
    }
    if let Commands::Serve { bind: Some(bind) } = &cli.command {
        settings.bind = *bind;
    }

    let orchestrator = Arc::new(
        Orchestrator::builder()
            .settings(settings.clone())
            .build()
            .await?,
    );
    let out = output::CliOutput;

    let result = match cli.command {
        Commands::Serve { .. } => commands::run_serve(orchestrator.clone(), &settings).await,
        Commands::Services(cmd) => commands::run_services(&orchestrator, cmd, &out).await,
        Commands::Start { service } => commands::run_start(&orchestrator, &service, &out).await,
        Commands::Stop { service } => commands::run_stop(&orchestrator, &service, &out).await,
        Commands::Restart { service } => {
            commands::run_restart(&orchestrator, &service, &out).await
        }
        Commands::Status { service, json } => {
            commands::run_status(&orchestrator, service.as_deref(), json, &out).await
        }
        Commands::Logs { service, tail } => {
            commands::run_logs(&orchestrator, &service, tail, &out).await
        }
        Commands::Stats { service, json } => {
            commands::run_stats(&orchestrator, &service, json, &out).await
        }
        Commands::Health { service } => commands::run_health(&orchestrator, &service, &out).await,
        Commands::Layouts(cmd) => commands::run_layouts(&orchestrator, cmd, &out).await,
        Commands::Catalog(cmd) => commands::run_catalog(&orchestrator, cmd, &out).await,
    };

    orchestrator.shutdown().await?;
    result
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;
    Ok(())
}
