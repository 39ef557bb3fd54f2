//! Configuration for streamwatch-daemon

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Liveness server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Stream registry configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Monitor service configuration
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Liveness server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Stream registry (CouchDB) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the document store
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Database holding the stream documents
    #[serde(default = "default_registry_database")]
    pub database: String,

    /// Basic auth user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            database: default_registry_database(),
            username: None,
            password: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl RegistryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Monitor service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Base URL of the monitor service
    #[serde(default = "default_monitor_url")]
    pub url: String,

    /// Bearer token for the monitor service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: default_monitor_url(),
            token: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl MonitorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Reconciliation interval in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Upper bound on fetching the token and both snapshots, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Upper bound on each registration call, in seconds
    #[serde(default = "default_register_timeout")]
    pub register_timeout_secs: u64,

    /// Run a pass immediately on startup instead of waiting one interval
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
            register_timeout_secs: default_register_timeout(),
            run_on_start: true,
        }
    }
}

impl SchedulerConfig {
    /// Tick period, never shorter than one second
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn register_timeout(&self) -> Duration {
        Duration::from_secs(self.register_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_registry_url() -> String {
    "http://127.0.0.1:5984".to_string()
}

fn default_registry_database() -> String {
    "streams".to_string()
}

fn default_monitor_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_interval() -> u64 {
    5
}

fn default_fetch_timeout() -> u64 {
    60
}

fn default_register_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Environment variables, e.g. STREAMWATCH_MONITOR__URL
        builder = builder.add_source(
            config::Environment::with_prefix("STREAMWATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Check values that would leave the daemon unable to do anything useful
    pub fn validate(&self) -> Result<(), String> {
        if self.scheduler.interval_secs == 0 {
            return Err("scheduler.interval_secs must be greater than zero".to_string());
        }
        if self.scheduler.fetch_timeout_secs == 0 {
            return Err("scheduler.fetch_timeout_secs must be greater than zero".to_string());
        }
        if self.scheduler.register_timeout_secs == 0 {
            return Err("scheduler.register_timeout_secs must be greater than zero".to_string());
        }
        if self.registry.url.trim().is_empty() {
            return Err("registry.url must not be empty".to_string());
        }
        if self.registry.database.trim().is_empty() {
            return Err("registry.database must not be empty".to_string());
        }
        if self.monitor.url.trim().is_empty() {
            return Err("monitor.url must not be empty".to_string());
        }
        Ok(())
    }
}
