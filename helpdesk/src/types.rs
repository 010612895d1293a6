//! Domain types for the help-desk service.
//!
//! Value objects, the `Issue` entity, and the actor model used by the
//! lifecycle engine and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an issue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(Uuid);

impl IssueId {
    /// Creates a new random `IssueId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `IssueId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to the software an issue was reported against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoftwareId(Uuid);

impl SoftwareId {
    /// Creates a new random `SoftwareId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `SoftwareId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SoftwareId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SoftwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque subject identifier for a caller (employee or technician).
///
/// This is whatever the identity resolver hands back for a credential,
/// typically an email-like subject claim. The service never interprets it
/// beyond equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Create an `ActorId` from a subject string
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    /// Get the subject as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Role a caller acts under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Submits, lists, cancels and deletes their own issues
    Employee,
    /// Claims unassigned issues
    Technician,
}

/// A resolved caller identity: subject plus role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    /// Subject identifier
    pub id: ActorId,
    /// Role the caller acts under
    pub role: Role,
}

impl Actor {
    /// Create an actor
    #[must_use]
    pub fn new(id: ActorId, role: Role) -> Self {
        Self { id, role }
    }

    /// Convenience constructor for an employee actor
    #[must_use]
    pub fn employee(subject: impl Into<String>) -> Self {
        Self::new(ActorId::new(subject), Role::Employee)
    }

    /// Convenience constructor for a technician actor
    #[must_use]
    pub fn technician(subject: impl Into<String>) -> Self {
        Self::new(ActorId::new(subject), Role::Technician)
    }
}

// ============================================================================
// Issue entity
// ============================================================================

/// Lifecycle status of an issue.
///
/// Transitions are strictly forward: an issue never returns to
/// `AwaitingTechAssignment`, and `CancelledByEmployee` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    /// Submitted, waiting for a technician to claim it
    AwaitingTechAssignment,
    /// Claimed by a technician
    AssignedToTech,
    /// Cancelled by the reporting employee (terminal)
    CancelledByEmployee,
}

impl IssueStatus {
    /// Whether this status allows no further transitions
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CancelledByEmployee)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingTechAssignment => "AwaitingTechAssignment",
            Self::AssignedToTech => "AssignedToTech",
            Self::CancelledByEmployee => "CancelledByEmployee",
        };
        write!(f, "{name}")
    }
}

/// A reported support issue.
///
/// `id`, `reported_by`, `software_id`, `description` and `reported_at` are
/// immutable after submission. `status`, `assigned_to` and `version` change
/// only through lifecycle-validated conditional writes; `assigned_to` is
/// `Some` exactly when `status == AssignedToTech`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier, assigned at creation
    pub id: IssueId,
    /// Subject of the submitting employee
    pub reported_by: ActorId,
    /// Subject of the claiming technician, while assigned
    pub assigned_to: Option<ActorId>,
    /// Software the issue was reported against
    pub software_id: SoftwareId,
    /// Free-text problem description
    pub description: String,
    /// Submission timestamp
    pub reported_at: DateTime<Utc>,
    /// Current lifecycle status
    pub status: IssueStatus,
    /// Optimistic-concurrency stamp; advances by exactly one per committed
    /// mutation, stamped by the store's conditional write
    pub version: u64,
}

impl Issue {
    /// Create a freshly submitted issue, awaiting technician assignment.
    ///
    /// The store assigns version `1` on insert; the entity starts there so a
    /// read-back matches what was written.
    #[must_use]
    pub fn submitted(
        id: IssueId,
        reported_by: ActorId,
        software_id: SoftwareId,
        description: String,
        reported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            reported_by,
            assigned_to: None,
            software_id,
            description,
            reported_at,
            status: IssueStatus::AwaitingTechAssignment,
            version: 1,
        }
    }

    /// Whether the assignment invariant holds: `assigned_to` is set exactly
    /// when the issue is assigned.
    #[must_use]
    pub fn assignment_invariant_holds(&self) -> bool {
        self.assigned_to.is_some() == (self.status == IssueStatus::AssignedToTech)
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Source of the current time, injected so submission timestamps are
/// deterministic in tests.
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Shared clock handle used by the service.
pub type SharedClock = Arc<dyn Clock>;
