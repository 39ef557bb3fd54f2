//! HTTP client for the HLS monitor service

use super::traits::MonitorService;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde_json::Value;
use streamwatch_types::MonitorMap;

/// Request body for submitting streams
#[derive(Debug, Serialize)]
struct AddStreamsRequest<'a> {
    streams: [&'a str; 1],
}

/// HTTP client for the monitor service's `/monitor` resource
pub struct HlsMonitorClient {
    client: Client,
    monitor_url: Url,
}

impl HlsMonitorClient {
    /// Create a monitor client from configuration
    pub fn new(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let monitor_url = Url::parse(&config.url)
            .and_then(|base| base.join("/monitor"))
            .map_err(|e| MonitorError::InvalidUrl(format!("{}: {}", config.url, e)))?;

        Ok(Self {
            client,
            monitor_url,
        })
    }
}

#[async_trait]
impl MonitorService for HlsMonitorClient {
    async fn list_monitors(&self, token: &str) -> Result<MonitorMap, MonitorError> {
        let response = self
            .client
            .get(self.monitor_url.clone())
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success(response, "get monitors")?;

        let body: Value = response.json().await?;
        let (monitors, rejected) = MonitorMap::from_value(body)?;

        for entry in &rejected {
            tracing::warn!(
                monitor_id = %entry.monitor_id,
                reason = %entry.reason,
                "Ignoring malformed monitor entry"
            );
        }

        Ok(monitors)
    }

    async fn register_stream(&self, token: &str, url: &str) -> Result<(), MonitorError> {
        let response = self
            .client
            .post(self.monitor_url.clone())
            .bearer_auth(token)
            .json(&AddStreamsRequest { streams: [url] })
            .send()
            .await?;
        ensure_success(response, "add stream to monitor")?;
        Ok(())
    }
}

fn ensure_success(response: Response, operation: &'static str) -> Result<Response, MonitorError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(MonitorError::Status {
            operation,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }
}
