//! Scheduler and reconciliation loop
//!
//! The scheduler is responsible for:
//! - Periodically converging monitor state towards the registry
//! - Keeping at most one reconciliation pass in flight
//! - Containing pass failures so the loop survives them

mod driver;
mod reconciler;

pub use driver::{PassOutcome, Scheduler};
pub use reconciler::{PassReport, Reconciler};
