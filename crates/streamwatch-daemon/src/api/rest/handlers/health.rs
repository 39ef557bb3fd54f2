//! Liveness and health handlers
//!
//! These answer from process state only and never touch the scheduler, so a
//! stuck dependency cannot make the probe fail.

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Fixed body returned by the liveness probe
pub const LIVENESS_BODY: &str = "Hello World";

/// Liveness probe
pub async fn liveness() -> &'static str {
    LIVENESS_BODY
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub started_at: String,
    pub uptime_secs: u64,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        started_at: state.started_at.to_rfc3339(),
        uptime_secs: state.uptime_secs(),
    })
}
