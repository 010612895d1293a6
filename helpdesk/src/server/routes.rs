//! Router configuration for the help-desk service.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{employee, tech};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// The boundary surface, verbatim (including the historical `/employees/`
/// plural on the delete route):
/// - `POST   /employee/problems`
/// - `GET    /employee/problems/:id`
/// - `GET    /employee/problems`
/// - `DELETE /employees/problems/:id`
/// - `POST   /employee/problems/:id/cancel`
/// - `POST   /tech/problems/:id/assign`
/// - `GET    /health`, `GET /ready`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Employee surface
        .route("/employee/problems", post(employee::submit_problem))
        .route("/employee/problems", get(employee::list_problems))
        .route("/employee/problems/:id", get(employee::get_problem))
        .route("/employees/problems/:id", delete(employee::delete_problem))
        .route(
            "/employee/problems/:id/cancel",
            post(employee::cancel_problem),
        )
        // Technician surface
        .route("/tech/problems/:id/assign", post(tech::assign_problem))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
