//! Technician-facing problem endpoints.
//!
//! - `POST /tech/problems/:id/assign` - claim an unassigned problem

use super::internal_error;
use crate::api::error::ApiError;
use crate::auth::AuthenticatedActor;
use crate::lifecycle::Rejection;
use crate::server::state::AppState;
use crate::service::ServiceError;
use crate::types::IssueId;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// Response after a successful assignment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignProblemResponse {
    /// The claimed problem
    pub problem_id: Uuid,
    /// The claiming technician
    pub assigned_to: String,
    /// Status after assignment
    pub status: String,
}

/// Claim a problem for the calling technician.
///
/// Under concurrent claims on the same problem, at most one caller gets the
/// 200; the rest get 400 with the already-assigned message, reflecting the
/// committed state.
///
/// Status mapping: 200 on success; 404 unknown id; 400 already assigned or
/// otherwise unassignable; 403 when the caller is not a technician.
pub async fn assign_problem(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(problem_id): Path<Uuid>,
) -> Result<Json<AssignProblemResponse>, ApiError> {
    match state
        .service
        .assign(IssueId::from_uuid(problem_id), &actor)
        .await
    {
        Ok(issue) => {
            let assigned_to = issue
                .assigned_to
                .map(|tech| tech.to_string())
                .unwrap_or_default();
            Ok(Json(AssignProblemResponse {
                problem_id: *issue.id.as_uuid(),
                assigned_to,
                status: issue.status.to_string(),
            }))
        }
        Err(ServiceError::Rejected(Rejection::NotFound)) => {
            Err(ApiError::not_found("Problem", problem_id))
        }
        Err(ServiceError::Rejected(Rejection::Unauthorized { .. })) => Err(ApiError::forbidden(
            "Only technicians may claim problems",
        )),
        Err(ServiceError::Rejected(Rejection::AlreadyAssigned { .. })) => Err(
            ApiError::bad_request("Problem is already assigned to another tech."),
        ),
        Err(ServiceError::Rejected(Rejection::InvalidState { status })) => {
            Err(ApiError::bad_request(format!(
                "Problem cannot be assigned. Current status: {status}"
            )))
        }
        Err(other) => Err(internal_error(other)),
    }
}
