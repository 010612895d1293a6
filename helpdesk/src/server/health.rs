//! Health check endpoints.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Liveness check: 200 OK if the process is up. Does not verify
/// dependencies.
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness
    pub ready: bool,
    /// Issue store reachability
    pub store: bool,
}

/// Readiness check: 200 OK when the service can accept traffic. With the
/// in-process store there is nothing external to probe; a remote-store
/// deployment would check connectivity here.
pub async fn readiness_check() -> (StatusCode, Json<ReadinessResponse>) {
    (
        StatusCode::OK,
        Json(ReadinessResponse {
            ready: true,
            store: true,
        }),
    )
}
