//! streamwatch daemon library
//!
//! This module provides the core components for the streamwatch daemon:
//! - Registry, monitor and credential clients
//! - Reconciler and scheduler
//! - Liveness API
//! - Server lifecycle management

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod server;

pub use clients::{
    CouchRegistry, HlsMonitorClient, InMemoryMonitor, InMemoryRegistry, MonitorService,
    StaticToken, StreamRegistry, TokenSource,
};
pub use config::DaemonConfig;
pub use error::{DaemonError, MonitorError, RegistryError, SyncError, TokenError};
pub use scheduler::{PassOutcome, PassReport, Reconciler, Scheduler};
pub use server::Server;
