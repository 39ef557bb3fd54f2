//! Request handlers

mod health;

pub use health::{health_check, liveness, HealthCheckResponse, LIVENESS_BODY};
