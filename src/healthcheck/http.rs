use super::{HealthProbe, HealthReport, HealthState};
use crate::catalog::ServiceDefinition;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// URL probed for `service`: its health path on the first published host port.
///
/// `None` when the service declares no health path or publishes no port.
pub fn probe_url(service: &ServiceDefinition, host: &str) -> Option<Result<url::Url>> {
    let path = service.health_check.as_deref()?.trim();
    let port = service.port_mappings().into_iter().next()?.host_port;

    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    let raw = format!("http://{}:{}{}", host, port, path);

    Some(url::Url::parse(&raw).map_err(|e| {
        Error::Validation(format!("Invalid health URL '{}' for {}: {}", raw, service.id, e))
    }))
}

/// Probes health endpoints with a plain GET; any 2xx is healthy.
pub struct HttpProbe {
    client: Client,
    host: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: host.into(),
            timeout,
        })
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, service: &ServiceDefinition) -> HealthReport {
        let url = match probe_url(service, &self.host) {
            None => {
                return HealthReport::unsupported(
                    &service.id,
                    "service has no health path or published port",
                )
            }
            Some(Err(e)) => return HealthReport::unsupported(&service.id, e.to_string()),
            Some(Ok(url)) => url,
        };

        debug!("Probing {} at {}", service.id, url);
        let result = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await;

        let (state, status_code, detail) = match result {
            Ok(response) => {
                let status = response.status();
                let state = if status.is_success() {
                    HealthState::Healthy
                } else {
                    HealthState::Unhealthy
                };
                (state, Some(status.as_u16()), None)
            }
            Err(e) => (HealthState::Unhealthy, None, Some(e.to_string())),
        };

        HealthReport {
            service_id: service.id.clone(),
            state,
            url: Some(url.to_string()),
            status_code,
            detail,
        }
    }
}
