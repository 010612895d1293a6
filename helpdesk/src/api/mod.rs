//! HTTP API: request/response types and handlers.
//!
//! Handlers are thin adapters over [`crate::service::IssueService`]: extract
//! identity, validate the payload, delegate, map the outcome to a status
//! code. The rejection-to-status tables differ per endpoint and are spelled
//! out next to each handler.

pub mod employee;
pub mod error;
pub mod tech;

use crate::service::ServiceError;
use crate::types::Issue;
use chrono::{DateTime, Utc};
use error::ApiError;
use serde::Serialize;
use uuid::Uuid;

/// Full issue representation returned by read endpoints and submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    /// Issue id
    pub id: Uuid,
    /// Subject of the reporting employee
    pub reported_by: String,
    /// Subject of the claiming technician, while assigned
    pub assigned_to: Option<String>,
    /// Software the issue was reported against
    pub software_id: Uuid,
    /// Problem description
    pub description: String,
    /// Submission timestamp
    pub reported_at: DateTime<Utc>,
    /// Current lifecycle status
    pub status: String,
}

impl From<Issue> for IssueResponse {
    fn from(issue: Issue) -> Self {
        Self {
            id: *issue.id.as_uuid(),
            reported_by: issue.reported_by.to_string(),
            assigned_to: issue.assigned_to.map(|actor| actor.to_string()),
            software_id: *issue.software_id.as_uuid(),
            description: issue.description,
            reported_at: issue.reported_at,
            status: issue.status.to_string(),
        }
    }
}

/// Map a store-layer failure to a generic server error. Rejections are
/// handled per-endpoint; reaching this with one is a handler bug.
pub(crate) fn internal_error(err: ServiceError) -> ApiError {
    ApiError::internal("An internal error occurred").with_source(err.into())
}
