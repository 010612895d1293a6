//! Issue store abstraction.
//!
//! A deliberately narrow repository interface over the durable issue store:
//! get by id, query by reporter, insert, and conditional update/remove keyed
//! on an expected version. Any storage engine can satisfy it; the service
//! ships with [`memory::InMemoryIssueStore`].
//!
//! The conditional writes are the linearization point for concurrent
//! mutations of the same issue: a write whose expected version is stale
//! fails with [`StoreError::VersionConflict`] instead of overwriting, and a
//! successful write stamps `version = expected + 1`. That keeps version
//! arithmetic in exactly one place.

pub mod memory;

pub use memory::InMemoryIssueStore;

use crate::types::{ActorId, Issue, IssueId, SoftwareId};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during issue store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict: another writer committed first.
    #[error("version conflict on issue {id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Issue the conflicting write targeted
        id: IssueId,
        /// Version the writer read before deciding
        expected: u64,
        /// Version actually stored at write time
        actual: u64,
    },

    /// No issue with this id exists.
    #[error("issue not found: {0}")]
    NotFound(IssueId),

    /// Insert collided with an existing id.
    #[error("issue already exists: {0}")]
    AlreadyExists(IssueId),

    /// Storage backend failure (connectivity, serialization). Not retried
    /// by the core; surfaces as a generic server failure at the boundary.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable keyed storage of issue entities.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Fetch an issue by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn get(&self, id: IssueId) -> Result<Option<Issue>, StoreError>;

    /// All issues reported by `reporter`, optionally narrowed to one piece
    /// of software. Ordered by submission time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn query_by_reporter(
        &self,
        reporter: &ActorId,
        software_id: Option<SoftwareId>,
    ) -> Result<Vec<Issue>, StoreError>;

    /// Insert a new issue. The entity's version must be `1`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] on id collision.
    async fn insert(&self, issue: Issue) -> Result<(), StoreError>;

    /// Replace the stored entity if its version still equals
    /// `expected_version`. On success the committed entity carries
    /// `expected_version + 1` and is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] if another writer committed
    /// first, [`StoreError::NotFound`] if the issue disappeared.
    async fn update(&self, expected_version: u64, issue: Issue) -> Result<Issue, StoreError>;

    /// Remove the entity if its version still equals `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] if another writer committed
    /// first, [`StoreError::NotFound`] if the issue disappeared.
    async fn remove(&self, id: IssueId, expected_version: u64) -> Result<(), StoreError>;
}
