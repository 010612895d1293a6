//! Assignment coordinator: atomic decide-then-persist.
//!
//! Wraps the lifecycle engine for the assign/cancel/delete paths and makes
//! the read → decide → write sequence safe under concurrent callers acting
//! on the same issue. The protocol is optimistic: read the entity with its
//! version, decide, then issue a conditional write keyed on that version.
//! If the write loses the race, re-read once, re-decide against the fresh
//! state, and either surface the fresh rejection or try the write one final
//! time. There is no unbounded retry loop: a second lost race is reported
//! as the conflict it is.
//!
//! Among N concurrent assignment attempts on one issue, at most one commits;
//! every other caller gets a rejection consistent with the committed state,
//! never a torn write.

use crate::lifecycle::{decide, IssueAction, Rejection, Transition};
use crate::store::{IssueStore, StoreError};
use crate::types::{Actor, Issue, IssueId};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the coordinator.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The lifecycle engine refused the transition.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The store failed for reasons other than a version race.
    #[error(transparent)]
    Store(StoreError),
}

/// A committed transition, as stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Committed {
    /// The entity was updated; carries the committed state (version stamped)
    Updated(Issue),
    /// The entity was removed; carries the state that was removed
    Removed(Issue),
}

/// Outcome of a single conditional-write attempt.
enum Attempt {
    Committed(Committed),
    /// Another writer got there first; the caller may re-check once
    LostRace,
}

/// Coordinates lifecycle transitions against the store.
#[derive(Clone)]
pub struct AssignmentCoordinator {
    store: Arc<dyn IssueStore>,
}

impl AssignmentCoordinator {
    /// Create a coordinator over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self { store }
    }

    /// Apply `action` to the issue `id` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::Rejected`] when the engine refuses the transition
    /// (against the freshest state observed), [`CoordinatorError::Store`] on
    /// backend failure.
    pub async fn apply(
        &self,
        id: IssueId,
        action: IssueAction,
        actor: &Actor,
    ) -> Result<Committed, CoordinatorError> {
        let current = self.store.get(id).await.map_err(CoordinatorError::Store)?;

        match self.attempt(current, action, actor).await? {
            Attempt::Committed(committed) => Ok(committed),
            Attempt::LostRace => {
                // One re-check against the fresh committed state. If the
                // fresh state still accepts and the write loses again, give
                // the caller the conflict instead of looping.
                let fresh = self.store.get(id).await.map_err(CoordinatorError::Store)?;
                let status = fresh.as_ref().map(|issue| issue.status);

                match self.attempt(fresh, action, actor).await? {
                    Attempt::Committed(committed) => Ok(committed),
                    Attempt::LostRace => Err(lost_race_rejection(action, status).into()),
                }
            }
        }
    }

    /// Decide against `current` and, if accepted, issue the conditional
    /// write. A version conflict (or an entity that vanished between read
    /// and write) is reported as a lost race.
    async fn attempt(
        &self,
        current: Option<Issue>,
        action: IssueAction,
        actor: &Actor,
    ) -> Result<Attempt, CoordinatorError> {
        let expected_version = current.as_ref().map_or(0, |issue| issue.version);

        match decide(current.as_ref(), action, actor)? {
            Transition::Update(next) => match self.store.update(expected_version, next).await {
                Ok(committed) => Ok(Attempt::Committed(Committed::Updated(committed))),
                Err(StoreError::VersionConflict { .. } | StoreError::NotFound(_)) => {
                    Ok(Attempt::LostRace)
                }
                Err(other) => Err(CoordinatorError::Store(other)),
            },
            Transition::Remove(prior) => match self.store.remove(prior.id, expected_version).await
            {
                Ok(()) => Ok(Attempt::Committed(Committed::Removed(prior))),
                Err(StoreError::VersionConflict { .. } | StoreError::NotFound(_)) => {
                    Ok(Attempt::LostRace)
                }
                Err(other) => Err(CoordinatorError::Store(other)),
            },
        }
    }
}

/// Rejection handed to a caller whose second write attempt also lost.
///
/// The true committed state moved twice underneath us; report the conflict
/// the action implies, carrying the freshest status we observed.
fn lost_race_rejection(action: IssueAction, status: Option<crate::types::IssueStatus>) -> Rejection {
    let Some(status) = status else {
        return Rejection::NotFound;
    };
    match action {
        IssueAction::Assign => Rejection::AlreadyAssigned { status },
        IssueAction::Cancel | IssueAction::Delete => Rejection::InvalidState { status },
    }
}
