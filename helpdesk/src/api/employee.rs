//! Employee-facing problem endpoints.
//!
//! - `POST /employee/problems` - submit a problem
//! - `GET /employee/problems/:id` - fetch one problem
//! - `GET /employee/problems?softwareId=` - list the caller's problems
//! - `DELETE /employees/problems/:id` - delete while unassigned
//! - `POST /employee/problems/:id/cancel` - cancel while unassigned
//!
//! The `/employees/` plural on the delete route is the surface the service
//! has always exposed; clients depend on it.

use super::{internal_error, IssueResponse};
use crate::api::error::ApiError;
use crate::auth::AuthenticatedActor;
use crate::lifecycle::Rejection;
use crate::server::state::AppState;
use crate::service::{ServiceError, SubmitIssue};
use crate::types::{IssueId, SoftwareId};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted problem description.
const MAX_DESCRIPTION_LEN: usize = 2000;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to submit a new problem.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProblemRequest {
    /// Software the problem is about
    pub software_id: Uuid,
    /// Free-text problem description
    pub description: String,
}

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProblemsParams {
    /// Narrow the list to one piece of software
    pub software_id: Option<Uuid>,
}

/// Response for the list endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemCollectionResponse {
    /// The caller's problems
    pub problems: Vec<IssueResponse>,
    /// Number of problems returned
    pub total: usize,
    /// Filters that were applied
    pub filtering_by: Vec<String>,
}

/// Response after cancelling a problem.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelProblemResponse {
    /// The cancelled problem
    pub problem_id: Uuid,
    /// Status after cancellation
    pub status: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new problem.
///
/// Field-level validation happens here, before the core sees the request.
/// Returns 201 with the created ticket, status `AwaitingTechAssignment`, and
/// a `Location` header pointing at the new resource.
pub async fn submit_problem(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(request): Json<SubmitProblemRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<IssueResponse>), ApiError> {
    let description = request.description.trim();
    if description.is_empty() {
        return Err(ApiError::bad_request("Description must not be empty"));
    }
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::bad_request(format!(
            "Description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }

    let issue = state
        .service
        .submit(
            SubmitIssue {
                software_id: SoftwareId::from_uuid(request.software_id),
                description: description.to_string(),
            },
            &actor,
        )
        .await
        .map_err(internal_error)?;

    let location = format!("/employee/problems/{}", issue.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(issue.into()),
    ))
}

/// Fetch one problem by id.
pub async fn get_problem(
    State(state): State<AppState>,
    AuthenticatedActor(_actor): AuthenticatedActor,
    Path(problem_id): Path<Uuid>,
) -> Result<Json<IssueResponse>, ApiError> {
    match state.service.get(IssueId::from_uuid(problem_id)).await {
        Ok(issue) => Ok(Json(issue.into())),
        Err(ServiceError::Rejected(Rejection::NotFound)) => {
            Err(ApiError::not_found("Problem", problem_id))
        }
        Err(other) => Err(internal_error(other)),
    }
}

/// List the caller's problems, optionally filtered by software.
pub async fn list_problems(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Query(params): Query<ListProblemsParams>,
) -> Result<Json<ProblemCollectionResponse>, ApiError> {
    let software_id = params.software_id.map(SoftwareId::from_uuid);
    let issues = state
        .service
        .list(&actor, software_id)
        .await
        .map_err(internal_error)?;

    let filtering_by = software_id
        .map(|s| vec![format!("softwareId={s}")])
        .unwrap_or_default();

    Ok(Json(ProblemCollectionResponse {
        total: issues.len(),
        problems: issues.into_iter().map(IssueResponse::from).collect(),
        filtering_by,
    }))
}

/// Delete a problem that is still awaiting assignment.
///
/// Status mapping: 204 on success, and "not found" is treated as a no-op
/// 204 too; 401 when the caller is not the reporter; 409 when the problem
/// has moved past `AwaitingTechAssignment`.
pub async fn delete_problem(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(problem_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match state
        .service
        .delete(IssueId::from_uuid(problem_id), &actor)
        .await
    {
        Ok(()) | Err(ServiceError::Rejected(Rejection::NotFound)) => Ok(StatusCode::NO_CONTENT),
        Err(ServiceError::Rejected(Rejection::Unauthorized { .. })) => Err(
            ApiError::unauthorized("Only the reporter may delete this problem"),
        ),
        Err(ServiceError::Rejected(
            Rejection::InvalidState { .. } | Rejection::AlreadyAssigned { .. },
        )) => Err(ApiError::conflict(
            "Problem is no longer awaiting assignment",
        )),
        Err(other) => Err(internal_error(other)),
    }
}

/// Cancel a problem that is still awaiting assignment.
///
/// Status mapping: 200 with `{problemId, status: "Cancelled"}`; 404 unknown
/// id; 403 non-reporter; 400 when the state no longer allows cancellation.
pub async fn cancel_problem(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(problem_id): Path<Uuid>,
) -> Result<Json<CancelProblemResponse>, ApiError> {
    match state
        .service
        .cancel(IssueId::from_uuid(problem_id), &actor)
        .await
    {
        Ok(issue) => Ok(Json(CancelProblemResponse {
            problem_id: *issue.id.as_uuid(),
            status: "Cancelled".to_string(),
        })),
        Err(ServiceError::Rejected(Rejection::NotFound)) => {
            Err(ApiError::not_found("Problem", problem_id))
        }
        Err(ServiceError::Rejected(Rejection::Unauthorized { .. })) => Err(ApiError::forbidden(
            "Only the reporter may cancel this problem",
        )),
        Err(ServiceError::Rejected(
            Rejection::InvalidState { status } | Rejection::AlreadyAssigned { status },
        )) => Err(ApiError::bad_request(format!(
            "Problem cannot be cancelled. Current status: {status}"
        ))),
        Err(other) => Err(internal_error(other)),
    }
}
