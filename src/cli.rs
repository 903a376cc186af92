use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orch")]
#[command(about = "Tool Orchestrator - run a catalog of containerized developer tools")]
#[command(version)]
pub struct Cli {
    /// SQLite database path (overrides ORCH_DATABASE)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP/WebSocket API
    Serve {
        /// Address to bind (overrides ORCH_BIND)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Manage catalog entries
    #[command(subcommand)]
    Services(ServicesCommands),
    /// Start a service's container
    Start { service: String },
    /// Stop a service's container
    Stop { service: String },
    /// Stop, settle, and start a service's container
    Restart { service: String },
    /// Show resolved container status
    Status {
        /// Service to inspect (defaults to all)
        service: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show container logs
    Logs {
        service: String,

        /// Number of trailing lines
        #[arg(short = 'n', long, default_value_t = 100)]
        tail: usize,
    },
    /// Show CPU and memory usage
    Stats {
        service: String,

        #[arg(long)]
        json: bool,
    },
    /// Probe a service's health endpoint
    Health { service: String },
    /// Manage saved dashboard layouts
    #[command(subcommand)]
    Layouts(LayoutsCommands),
    /// Catalog import
    #[command(subcommand)]
    Catalog(CatalogCommands),
}

#[derive(Subcommand)]
pub enum ServicesCommands {
    /// List catalog entries
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one entry with its container status
    Show { service: String },
    /// Add an entry from a JSON definition (id derived from name)
    Create {
        /// Path to a JSON file with name, category, image, ...
        file: PathBuf,
    },
    /// Remove an entry and its lifecycle record
    Delete { service: String },
    /// Mark an entry enabled
    Enable { service: String },
    /// Mark an entry disabled
    Disable { service: String },
}

#[derive(Subcommand)]
pub enum LayoutsCommands {
    /// List saved layouts
    List,
    /// Save a layout
    Create {
        name: String,

        /// JSON file holding the layout array
        #[arg(long)]
        data: Option<PathBuf>,

        /// Make this the default layout
        #[arg(long)]
        default: bool,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Add entries from a YAML catalog; existing ids are skipped
    Import { file: PathBuf },
}
