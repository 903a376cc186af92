use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(orch::config::error))]
    Config(String),

    #[error("Invalid request: {0}")]
    #[diagnostic(code(orch::request::invalid))]
    Validation(String),

    #[error("Service not found: {0}")]
    #[diagnostic(
        code(orch::service::not_found),
        help("List the catalog with `orch services list`")
    )]
    ServiceNotFound(String),

    #[error("Container not found for service '{0}'")]
    #[diagnostic(
        code(orch::container::not_found),
        help("Start the container with: orch start {0}")
    )]
    ContainerNotFound(String),

    #[error("Container runtime not available: {0}")]
    #[diagnostic(
        code(orch::runtime::unavailable),
        help("This feature requires Docker. Check that the daemon is running with `docker ps`")
    )]
    RuntimeUnavailable(String),

    #[error("Container runtime error: {0}")]
    #[diagnostic(code(orch::runtime::api))]
    RuntimeApi(String),

    #[error("Conflict: {0}")]
    #[diagnostic(code(orch::store::conflict))]
    Conflict(String),

    #[error("Database error: {0}")]
    #[diagnostic(code(orch::database::error))]
    Database(#[from] tokio_rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the container engine itself could not be reached.
    ///
    /// Callers render this as a "feature unavailable" condition instead of a
    /// generic failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::RuntimeUnavailable(_))
    }

    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::ServiceNotFound(id) => Some(format!(
                "No catalog entry with id '{}'. Run `orch services list` to see available services.",
                id
            )),
            Error::ContainerNotFound(id) => Some(format!(
                "No container named 'orch_{}' exists. Start it with: orch start {}",
                id, id
            )),
            Error::RuntimeUnavailable(_) => Some(
                "Docker does not appear to be running. Start the Docker daemon and retry.".to_string(),
            ),
            Error::RuntimeApi(msg) if msg.contains("already in use") => Some(
                "A container with this name already exists. Stop it first, or use `orch restart`.".to_string(),
            ),
            Error::Conflict(_) => Some(
                "A service with the same identifier already exists. Pick a different name.".to_string(),
            ),
            Error::Config(_) => Some(
                "Check the ORCH_* environment variables and your .env file.".to_string(),
            ),
            Error::Database(e) => {
                // tokio_rusqlite wraps the rusqlite error opaquely, so match on the message.
                let err_str = e.to_string();
                if err_str.contains("database is locked") || err_str.contains("SQLITE_BUSY") {
                    Some("Another orch process is holding the database. Retry in a moment.".to_string())
                } else if err_str.contains("malformed") || err_str.contains("SQLITE_CORRUPT") {
                    Some("The database file is corrupted. Move it aside and let orch re-create it.".to_string())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}
