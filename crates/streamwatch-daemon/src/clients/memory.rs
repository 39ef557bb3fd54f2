//! In-memory registry and monitor for development and testing

use super::traits::{MonitorService, StreamRegistry};
use crate::error::{MonitorError, RegistryError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use streamwatch_types::{MonitorEntry, MonitorMap, StreamRecord, TrackedStream};
use tokio::sync::RwLock;

/// In-memory stream registry
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    streams: RwLock<Vec<StreamRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryRegistry {
    pub fn with_streams(streams: Vec<StreamRecord>) -> Self {
        Self {
            streams: RwLock::new(streams),
            unavailable: AtomicBool::new(false),
        }
    }

    pub async fn add_stream(&self, stream: StreamRecord) {
        self.streams.write().await.push(stream);
    }

    /// Make subsequent listings fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl StreamRegistry for InMemoryRegistry {
    async fn list_streams(&self) -> Result<Vec<StreamRecord>, RegistryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
            });
        }
        Ok(self.streams.read().await.clone())
    }
}

/// In-memory monitor service.
///
/// Every accepted URL is placed in a fresh monitor entry, and every
/// registration attempt is recorded whether it succeeds or not.
#[derive(Debug, Default)]
pub struct InMemoryMonitor {
    monitors: RwLock<MonitorMap>,
    attempts: RwLock<Vec<String>>,
    rejected_urls: RwLock<HashSet<String>>,
    list_calls: AtomicUsize,
    unavailable: AtomicBool,
    list_delay: Option<Duration>,
    register_delay: Option<Duration>,
}

impl InMemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monitors(monitors: MonitorMap) -> Self {
        Self {
            monitors: RwLock::new(monitors),
            ..Self::default()
        }
    }

    /// Delay every listing, simulating a monitor that stops answering
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Delay every registration call, simulating a slow monitor
    pub fn with_register_delay(mut self, delay: Duration) -> Self {
        self.register_delay = Some(delay);
        self
    }

    /// Answer registrations of this URL with a server error
    pub async fn reject_url(&self, url: impl Into<String>) {
        self.rejected_urls.write().await.insert(url.into());
    }

    /// Make subsequent listings fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// URLs passed to `register_stream`, in call order
    pub async fn registration_attempts(&self) -> Vec<String> {
        self.attempts.read().await.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> MonitorMap {
        self.monitors.read().await.clone()
    }
}

#[async_trait]
impl MonitorService for InMemoryMonitor {
    async fn list_monitors(&self, _token: &str) -> Result<MonitorMap, MonitorError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MonitorError::Status {
                operation: "get monitors",
                status: 502,
                reason: "Bad Gateway".to_string(),
            });
        }
        Ok(self.monitors.read().await.clone())
    }

    async fn register_stream(&self, _token: &str, url: &str) -> Result<(), MonitorError> {
        self.attempts.write().await.push(url.to_string());

        if let Some(delay) = self.register_delay {
            tokio::time::sleep(delay).await;
        }

        if self.rejected_urls.read().await.contains(url) {
            return Err(MonitorError::Status {
                operation: "add stream to monitor",
                status: 500,
                reason: "Internal Server Error".to_string(),
            });
        }

        let mut monitors = self.monitors.write().await;
        let monitor_id = format!("monitor-{}", monitors.len() + 1);
        monitors.insert(
            monitor_id.clone(),
            MonitorEntry {
                created_at: Some(chrono::Utc::now().to_rfc3339()),
                state: Some("active".to_string()),
                error_count: Some(0),
                status_endpoint: Some(format!("/monitor/{}/status", monitor_id)),
                ..MonitorEntry::with_streams(vec![TrackedStream::new(
                    format!("{}-0", monitor_id),
                    url,
                )])
            },
        );

        Ok(())
    }
}
