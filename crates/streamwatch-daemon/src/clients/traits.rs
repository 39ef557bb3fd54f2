//! Client trait definitions

use crate::error::{MonitorError, RegistryError, TokenError};
use async_trait::async_trait;
use streamwatch_types::{MonitorMap, StreamRecord};

/// Read access to the stream registry
#[async_trait]
pub trait StreamRegistry: Send + Sync {
    /// List every stream in the registry, in store order.
    ///
    /// Documents that are missing or carry no stream URL are dropped.
    async fn list_streams(&self) -> Result<Vec<StreamRecord>, RegistryError>;
}

/// Access to the monitor service
#[async_trait]
pub trait MonitorService: Send + Sync {
    /// Fetch the full current monitor state
    async fn list_monitors(&self, token: &str) -> Result<MonitorMap, MonitorError>;

    /// Submit a single stream URL for monitoring.
    ///
    /// Success means the monitor accepted responsibility for the URL; which
    /// entry ends up tracking it is the monitor's own business.
    async fn register_stream(&self, token: &str, url: &str) -> Result<(), MonitorError>;
}

/// Source of bearer credentials for the monitor service
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Obtain a token for one reconciliation pass
    async fn token(&self) -> Result<String, TokenError>;
}
