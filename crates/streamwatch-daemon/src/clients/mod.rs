//! Clients for the two external systems and the credential issuer
//!
//! The registry is the source of truth for which streams exist; the monitor
//! service is what gets converged towards it.

mod couchdb;
mod hls_monitor;
mod memory;
mod token;
mod traits;

pub use couchdb::CouchRegistry;
pub use hls_monitor::HlsMonitorClient;
pub use memory::{InMemoryMonitor, InMemoryRegistry};
pub use token::StaticToken;
pub use traits::{MonitorService, StreamRegistry, TokenSource};
