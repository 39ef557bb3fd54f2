//! Error types for streamwatch-daemon

use std::time::Duration;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reading the stream registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Transport failure, including timeouts and undecodable bodies
    #[error("Registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the registry
    #[error("Failed to list streams: {status} {reason}")]
    Status { status: u16, reason: String },

    /// Registry endpoint could not be built
    #[error("Invalid registry URL: {0}")]
    InvalidUrl(String),
}

/// Errors talking to the monitor service
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Transport failure, including timeouts and undecodable bodies
    #[error("Monitor request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the monitor
    #[error("Failed to {operation}: {reason}")]
    Status {
        operation: &'static str,
        status: u16,
        reason: String,
    },

    /// Monitor state was not a JSON object
    #[error("Invalid monitor state: {0}")]
    InvalidState(#[from] streamwatch_types::MonitorStateError),

    /// Monitor endpoint could not be built
    #[error("Invalid monitor URL: {0}")]
    InvalidUrl(String),
}

/// Errors obtaining the monitor credential
#[derive(Debug, Error)]
pub enum TokenError {
    /// No credential configured
    #[error("No monitor access token configured")]
    Missing,
}

/// Errors that end a reconciliation pass
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// The pass did not finish within its deadline
    #[error("Reconciliation pass timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Result type alias for reconciliation operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_carries_reason() {
        let err = MonitorError::Status {
            operation: "add stream to monitor",
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to add stream to monitor: Service Unavailable"
        );
    }

    #[test]
    fn test_sync_error_is_transparent() {
        let err: SyncError = TokenError::Missing.into();
        assert_eq!(err.to_string(), "No monitor access token configured");
    }
}
