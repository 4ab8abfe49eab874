//! Liveness endpoint for process supervisors and load balancers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::AppState;

/// Liveness response body.
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    /// Always `"alive"`.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Secret provider in use (`env` or `kms`).
    pub secret_provider: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Time the probe was answered.
    pub timestamp: DateTime<Utc>,
}

/// Liveness check.
///
/// Touches no external dependency: neither the key-management service nor
/// git is contacted, so a failing remote never marks the process dead.
#[instrument(name = "liveness_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    debug!("Performing liveness check");

    let response = LivenessResponse {
        status: "alive",
        service: "hubsync",
        secret_provider: state.update_service.secret_variant(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    };

    (StatusCode::OK, Json(response)).into_response()
}
