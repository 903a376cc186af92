//! One-shot health probes against a tool's published HTTP endpoint.

mod http;

pub use http::{probe_url, HttpProbe};

use crate::catalog::ServiceDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
    /// No health path or no published port to probe
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub service_id: String,
    pub state: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthReport {
    pub fn unsupported(service_id: &str, detail: impl Into<String>) -> Self {
        Self {
            service_id: service_id.to_string(),
            state: HealthState::Unsupported,
            url: None,
            status_code: None,
            detail: Some(detail.into()),
        }
    }
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, service: &ServiceDefinition) -> HealthReport;
}
