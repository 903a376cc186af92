//! Minimal Docker Engine API client over the daemon's Unix socket.
//!
//! Used only where the CLI falls short: `docker stats` prints pre-computed
//! percentages, while the API returns the raw CPU and memory counters.

use super::DockerError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CpuUsage {
    #[serde(default)]
    pub total_usage: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CpuStats {
    #[serde(default)]
    pub cpu_usage: CpuUsage,
    #[serde(default)]
    pub system_cpu_usage: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryStats {
    #[serde(default)]
    pub usage: u64,
    #[serde(default)]
    pub limit: u64,
}

/// One-shot stats document (`/containers/{id}/stats?stream=false`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStats {
    #[serde(default)]
    pub cpu_stats: CpuStats,
    #[serde(default)]
    pub precpu_stats: CpuStats,
    #[serde(default)]
    pub memory_stats: MemoryStats,
}

/// Host part of Engine API URLs; the Unix socket decides where requests go.
const ENGINE_BASE: &str = "http://docker";

#[derive(Debug, Clone)]
pub struct EngineClient {
    socket: PathBuf,
    http: reqwest::Client,
}

impl EngineClient {
    /// Client whose every request is routed over the daemon socket at `socket`.
    pub fn new(socket: impl Into<PathBuf>) -> Result<Self, DockerError> {
        let socket = socket.into();
        let builder = reqwest::Client::builder();
        #[cfg(unix)]
        let builder = builder.unix_socket(socket.clone());
        let http = builder.build().map_err(|e| DockerError::Engine {
            status: 0,
            message: format!("failed to build Engine API client: {}", e),
        })?;

        Ok(Self { socket, http })
    }

    /// Fetch one stats sample for `container` (name or id).
    pub async fn stats(&self, container: &str, timeout: Duration) -> Result<RawStats, DockerError> {
        let url = format!("{}/containers/{}/stats", ENGINE_BASE, container);
        debug!("GET {} via {}", url, self.socket.display());

        let response = self
            .http
            .get(&url)
            .query(&[("stream", "false")])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.request_error(&url, timeout, e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.request_error(&url, timeout, e))?;

        match status {
            200 => serde_json::from_slice(&body).map_err(|e| DockerError::Engine {
                status,
                message: format!("invalid stats document: {}", e),
            }),
            404 => Err(DockerError::ContainerNotFound {
                container: container.to_string(),
            }),
            _ => Err(DockerError::Engine {
                status,
                message: String::from_utf8_lossy(&body).trim().to_string(),
            }),
        }
    }

    fn request_error(&self, url: &str, timeout: Duration, err: reqwest::Error) -> DockerError {
        if err.is_timeout() {
            DockerError::timeout(format!("GET {}", url), timeout)
        } else if err.is_connect() {
            DockerError::Socket {
                path: self.socket.clone(),
                source: err,
            }
        } else {
            DockerError::Engine {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}
