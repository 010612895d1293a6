//! Issue service: the composition root.
//!
//! Orchestrates store → lifecycle engine → coordinator → broadcaster for
//! every operation. This is the only component that talks to the external
//! collaborators (identity comes resolved as an [`Actor`], metrics go to the
//! [`IssueMetrics`] sink). Handlers above it are thin adapters; everything
//! below it is a narrow interface.

use crate::broadcast::{Broadcaster, IssueEvent};
use crate::coordinator::{AssignmentCoordinator, Committed, CoordinatorError};
use crate::lifecycle::{IssueAction, Rejection};
use crate::metrics::IssueMetrics;
use crate::store::{IssueStore, StoreError};
use crate::types::{Actor, Issue, IssueId, SharedClock, SoftwareId};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The lifecycle engine refused the transition.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The store failed (connectivity, serialization). Not retried; maps to
    /// a generic server failure at the boundary.
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl From<CoordinatorError> for ServiceError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::Rejected(rejection) => Self::Rejected(rejection),
            CoordinatorError::Store(store) => Self::Store(store),
        }
    }
}

/// A validated submission payload.
///
/// Field-level validation happens at the boundary before this is built; the
/// core treats the contents as opaque.
#[derive(Clone, Debug)]
pub struct SubmitIssue {
    /// Software the issue is reported against
    pub software_id: SoftwareId,
    /// Free-text problem description
    pub description: String,
}

/// Issue lifecycle service.
pub struct IssueService {
    store: Arc<dyn IssueStore>,
    coordinator: AssignmentCoordinator,
    broadcaster: Arc<dyn Broadcaster>,
    metrics: IssueMetrics,
    clock: SharedClock,
}

impl IssueService {
    /// Wire up the service from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn IssueStore>,
        broadcaster: Arc<dyn Broadcaster>,
        metrics: IssueMetrics,
        clock: SharedClock,
    ) -> Self {
        Self {
            coordinator: AssignmentCoordinator::new(store.clone()),
            store,
            broadcaster,
            metrics,
            clock,
        }
    }

    /// Submit a new issue on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if persistence fails.
    pub async fn submit(&self, request: SubmitIssue, actor: &Actor) -> Result<Issue, ServiceError> {
        let issue = Issue::submitted(
            IssueId::new(),
            actor.id.clone(),
            request.software_id,
            request.description,
            self.clock.now(),
        );
        self.store.insert(issue.clone()).await?;
        self.metrics
            .issue_created(&issue.reported_by, issue.id, issue.software_id);
        tracing::info!(issue_id = %issue.id, reporter = %issue.reported_by, "issue submitted");
        Ok(issue)
    }

    /// Fetch an issue by id.
    ///
    /// # Errors
    ///
    /// [`Rejection::NotFound`] if no such issue exists; [`ServiceError::Store`]
    /// on backend failure.
    pub async fn get(&self, id: IssueId) -> Result<Issue, ServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or(ServiceError::Rejected(Rejection::NotFound))
    }

    /// List issues reported by `actor`, optionally filtered by software.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on backend failure.
    pub async fn list(
        &self,
        actor: &Actor,
        software_id: Option<SoftwareId>,
    ) -> Result<Vec<Issue>, ServiceError> {
        Ok(self.store.query_by_reporter(&actor.id, software_id).await?)
    }

    /// Technician claims the issue.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`Rejection`] (not found, not a technician,
    /// already assigned) or [`ServiceError::Store`] on backend failure.
    pub async fn assign(&self, id: IssueId, actor: &Actor) -> Result<Issue, ServiceError> {
        let committed = self.run(id, IssueAction::Assign, actor).await?;
        let Committed::Updated(issue) = committed else {
            // Assign transitions always update
            return Err(ServiceError::Rejected(Rejection::NotFound));
        };

        self.metrics.issue_assigned(issue.id);
        if let Some(assigned_to) = issue.assigned_to.clone() {
            self.publish(IssueEvent::Assigned {
                issue_id: issue.id,
                assigned_to,
                status: issue.status,
            })
            .await;
        }
        tracing::info!(issue_id = %issue.id, technician = %actor.id, "issue assigned");
        Ok(issue)
    }

    /// Reporter cancels the issue.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`Rejection`] or [`ServiceError::Store`].
    pub async fn cancel(&self, id: IssueId, actor: &Actor) -> Result<Issue, ServiceError> {
        let committed = self.run(id, IssueAction::Cancel, actor).await?;
        let Committed::Updated(issue) = committed else {
            return Err(ServiceError::Rejected(Rejection::NotFound));
        };

        self.metrics.issue_cancelled(issue.id);
        self.publish(IssueEvent::Cancelled {
            issue_id: issue.id,
            status: issue.status,
        })
        .await;
        tracing::info!(issue_id = %issue.id, reporter = %actor.id, "issue cancelled");
        Ok(issue)
    }

    /// Reporter deletes the issue.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`Rejection`] or [`ServiceError::Store`].
    pub async fn delete(&self, id: IssueId, actor: &Actor) -> Result<(), ServiceError> {
        let committed = self.run(id, IssueAction::Delete, actor).await?;
        let Committed::Removed(issue) = committed else {
            return Ok(());
        };

        self.metrics.issue_deleted(issue.id);
        self.publish(IssueEvent::Deleted { issue_id: issue.id }).await;
        tracing::info!(issue_id = %issue.id, reporter = %actor.id, "issue deleted");
        Ok(())
    }

    /// Route a mutation through the coordinator, recording rejections.
    async fn run(
        &self,
        id: IssueId,
        action: IssueAction,
        actor: &Actor,
    ) -> Result<Committed, ServiceError> {
        match self.coordinator.apply(id, action, actor).await {
            Ok(committed) => Ok(committed),
            Err(CoordinatorError::Rejected(rejection)) => {
                self.metrics.rejection(rejection_kind(&rejection));
                Err(ServiceError::Rejected(rejection))
            }
            Err(CoordinatorError::Store(store)) => Err(ServiceError::Store(store)),
        }
    }

    /// Publish after commit. The transition already happened; a failed
    /// publish is logged and swallowed.
    async fn publish(&self, event: IssueEvent) {
        let topic = event.topic();
        if let Err(err) = self.broadcaster.publish(topic, event).await {
            tracing::warn!(%topic, error = %err, "broadcast publish failed; transition stands");
        }
    }
}

/// Stable label for a rejection kind.
const fn rejection_kind(rejection: &Rejection) -> &'static str {
    match rejection {
        Rejection::NotFound => "not_found",
        Rejection::Unauthorized { .. } => "unauthorized",
        Rejection::AlreadyAssigned { .. } => "already_assigned",
        Rejection::InvalidState { .. } => "invalid_state",
    }
}
