//! Application state for API handlers

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Whole seconds since start, zero if the clock stepped backwards
    pub fn uptime_secs(&self) -> u64 {
        (chrono::Utc::now() - self.started_at)
            .num_seconds()
            .try_into()
            .unwrap_or(0)
    }
}
