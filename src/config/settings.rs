use super::duration::parse_duration_setting;
use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATABASE: &str = "orchestrator.db";
pub const DEFAULT_BIND: &str = "0.0.0.0:8001";
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";
pub const DEFAULT_PROBE_HOST: &str = "localhost";

/// Upper bounds for every call that leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// stop / inspect / rm
    pub control: Duration,
    /// run, which may pull the image first
    pub start: Duration,
    pub logs: Duration,
    pub stats: Duration,
    /// Per-subscriber event delivery
    pub broadcast: Duration,
    /// Pause between stop and start during restart
    pub restart_settle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            control: Duration::from_secs(10),
            start: Duration::from_secs(300),
            logs: Duration::from_secs(30),
            stats: Duration::from_secs(10),
            broadcast: Duration::from_secs(2),
            restart_settle: Duration::from_secs(1),
        }
    }
}

/// Process-wide settings, read from `ORCH_*` environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: PathBuf,
    pub bind: SocketAddr,
    pub docker_socket: PathBuf,
    pub timeouts: Timeouts,
    /// Seed the built-in catalog into an empty database
    pub seed_catalog: bool,
    /// YAML catalog used for seeding instead of the built-in one
    pub catalog_file: Option<PathBuf>,
    /// Host used when probing a tool's health endpoint
    pub probe_host: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            bind: SocketAddr::from(([0, 0, 0, 0], 8001)),
            docker_socket: PathBuf::from(DEFAULT_DOCKER_SOCKET),
            timeouts: Timeouts::default(),
            seed_catalog: true,
            catalog_file: None,
            probe_host: DEFAULT_PROBE_HOST.to_string(),
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and then read the process environment.
    pub fn from_env() -> Result<Self> {
        load_dotenv()?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(db) = get("ORCH_DATABASE") {
            settings.database = PathBuf::from(db);
        }
        if let Some(bind) = get("ORCH_BIND") {
            settings.bind = parse_bind(&bind)?;
        }
        if let Some(socket) = get("ORCH_DOCKER_SOCKET") {
            settings.docker_socket = PathBuf::from(socket);
        }
        if let Some(seed) = get("ORCH_SEED_CATALOG") {
            settings.seed_catalog = parse_bool("ORCH_SEED_CATALOG", &seed)?;
        }
        settings.catalog_file = get("ORCH_CATALOG_FILE").map(PathBuf::from);
        if let Some(host) = get("ORCH_PROBE_HOST") {
            settings.probe_host = host;
        }

        let timeouts = &mut settings.timeouts;
        for (name, slot) in [
            ("ORCH_CONTROL_TIMEOUT", &mut timeouts.control),
            ("ORCH_START_TIMEOUT", &mut timeouts.start),
            ("ORCH_LOGS_TIMEOUT", &mut timeouts.logs),
            ("ORCH_STATS_TIMEOUT", &mut timeouts.stats),
            ("ORCH_BROADCAST_TIMEOUT", &mut timeouts.broadcast),
            ("ORCH_RESTART_SETTLE", &mut timeouts.restart_settle),
        ] {
            if let Some(value) = get(name) {
                *slot = parse_duration_setting(name, &value)?;
            }
        }

        Ok(settings)
    }
}

/// Load `.env` from the working directory into the process environment.
/// A missing file is not an error; existing variables are never overwritten.
fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!("Failed to load .env: {}", e))),
    }
}

pub fn parse_bind(value: &str) -> Result<SocketAddr> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", value, e)))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{} must be true or false (got '{}')",
            name, other
        ))),
    }
}
