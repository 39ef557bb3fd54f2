//! streamwatch Types - Core types for stream synchronization
//!
//! streamwatch keeps an HLS monitoring service's watch-list in line with a
//! registry of known streams. This crate holds the data model shared by the
//! registry client, the monitor client and the reconciler.
//!
//! ## Key Concepts
//!
//! - **StreamRecord**: A stream known to the registry
//! - **TrackedStream**: A stream URL as tracked by one monitor entry
//! - **MonitorEntry**: A unit of monitoring state owned by the monitor service
//! - **MonitorMap**: Validated monitor state, keyed by monitor identifier
//!
//! Streams are matched by URL only. Registry identifiers and monitor-side
//! stream identifiers live in separate namespaces and are never compared.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod monitor;
pub mod stream;

pub use monitor::{MonitorEntry, MonitorMap, MonitorStateError, RejectedEntry};
pub use stream::{StreamRecord, TrackedStream};
