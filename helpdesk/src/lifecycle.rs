//! Lifecycle engine for issue state transitions.
//!
//! Pure decision logic: given the current entity (if any), a requested
//! action and the acting caller, [`decide`] returns either the accepted
//! transition or a typed rejection. Nothing here touches storage; the
//! [`crate::coordinator::AssignmentCoordinator`] makes the accepted
//! transition atomic against concurrent writers.
//!
//! # Transition table
//!
//! The caller gate comes before the state gate: a non-technician assign or a
//! non-reporter cancel/delete is `Unauthorized` no matter what state the
//! issue is in.
//!
//! ```text
//! missing entity         + anything                 → NotFound
//! any state + Assign        by a non-technician     → Unauthorized
//! any state + Cancel/Delete by a non-reporter       → Unauthorized
//! AwaitingTechAssignment + Assign                   → AssignedToTech
//! AwaitingTechAssignment + Cancel                   → CancelledByEmployee
//! AwaitingTechAssignment + Delete                   → removed
//! AssignedToTech         + Assign                   → AlreadyAssigned
//! AssignedToTech         + Cancel/Delete            → InvalidState
//! CancelledByEmployee    + anything                 → InvalidState
//! ```

use crate::types::{Actor, Issue, IssueStatus, Role};
use thiserror::Error;

/// A lifecycle action requested against an issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueAction {
    /// Technician claims the issue
    Assign,
    /// Reporter cancels the issue
    Cancel,
    /// Reporter removes the issue entirely
    Delete,
}

/// An accepted transition, ready for the coordinator to commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Replace the stored entity with this new state
    Update(Issue),
    /// Remove the entity; carries the state that was removed
    Remove(Issue),
}

/// Why a requested transition was refused.
///
/// Rejections carry the status the entity held when the decision was made,
/// for diagnostics; they never mutate the input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    /// No issue with the requested id exists
    #[error("issue not found")]
    NotFound,

    /// The caller is not permitted to perform this action on this issue
    #[error("caller is not permitted to perform this action (status: {status})")]
    Unauthorized {
        /// Status at decision time
        status: IssueStatus,
    },

    /// The issue is already claimed by a technician
    #[error("issue is already assigned to another tech (status: {status})")]
    AlreadyAssigned {
        /// Status at decision time
        status: IssueStatus,
    },

    /// The issue's current status does not allow the requested action
    #[error("action is not allowed in the issue's current state (status: {status})")]
    InvalidState {
        /// Status at decision time
        status: IssueStatus,
    },
}

impl Rejection {
    /// Status the entity held when the rejection was produced, if it existed.
    #[must_use]
    pub const fn status(&self) -> Option<IssueStatus> {
        match self {
            Self::NotFound => None,
            Self::Unauthorized { status }
            | Self::AlreadyAssigned { status }
            | Self::InvalidState { status } => Some(*status),
        }
    }
}

/// Decide whether `actor` may apply `action` to `current`.
///
/// Pure: the input entity is only read, and the returned [`Transition`]
/// holds a fresh copy with the new state. Version stamping is the store's
/// concern and is untouched here.
///
/// # Errors
///
/// Returns the [`Rejection`] describing why the transition is refused.
pub fn decide(
    current: Option<&Issue>,
    action: IssueAction,
    actor: &Actor,
) -> Result<Transition, Rejection> {
    let Some(issue) = current else {
        return Err(Rejection::NotFound);
    };

    match action {
        IssueAction::Assign => {
            if actor.role != Role::Technician {
                return Err(Rejection::Unauthorized {
                    status: issue.status,
                });
            }
            match issue.status {
                IssueStatus::AwaitingTechAssignment => {
                    let mut next = issue.clone();
                    next.status = IssueStatus::AssignedToTech;
                    next.assigned_to = Some(actor.id.clone());
                    Ok(Transition::Update(next))
                }
                IssueStatus::AssignedToTech => Err(Rejection::AlreadyAssigned {
                    status: issue.status,
                }),
                IssueStatus::CancelledByEmployee => Err(Rejection::InvalidState {
                    status: issue.status,
                }),
            }
        }
        IssueAction::Cancel => {
            require_reporter(issue, actor)?;
            match issue.status {
                IssueStatus::AwaitingTechAssignment => {
                    let mut next = issue.clone();
                    next.status = IssueStatus::CancelledByEmployee;
                    Ok(Transition::Update(next))
                }
                IssueStatus::AssignedToTech | IssueStatus::CancelledByEmployee => {
                    Err(Rejection::InvalidState {
                        status: issue.status,
                    })
                }
            }
        }
        IssueAction::Delete => {
            require_reporter(issue, actor)?;
            match issue.status {
                IssueStatus::AwaitingTechAssignment => Ok(Transition::Remove(issue.clone())),
                IssueStatus::AssignedToTech | IssueStatus::CancelledByEmployee => {
                    Err(Rejection::InvalidState {
                        status: issue.status,
                    })
                }
            }
        }
    }
}

/// Ownership gate for reporter-only actions.
fn require_reporter(issue: &Issue, actor: &Actor) -> Result<(), Rejection> {
    if issue.reported_by == actor.id {
        Ok(())
    } else {
        Err(Rejection::Unauthorized {
            status: issue.status,
        })
    }
}
