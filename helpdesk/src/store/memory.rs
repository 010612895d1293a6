//! In-memory issue store.
//!
//! Keeps all issues in a `RwLock`-guarded map. Conditional writes take the
//! write guard for the whole check-and-swap, which linearizes concurrent
//! writers on the same issue; that single atomic section is what the
//! coordinator's optimistic protocol leans on.

use super::{IssueStore, StoreError};
use crate::types::{ActorId, Issue, IssueId, SoftwareId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory [`IssueStore`] implementation.
#[derive(Debug, Default)]
pub struct InMemoryIssueStore {
    issues: RwLock<HashMap<IssueId, Issue>>,
}

impl InMemoryIssueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored issues.
    pub async fn len(&self) -> usize {
        self.issues.read().await.len()
    }

    /// Whether the store holds no issues.
    pub async fn is_empty(&self) -> bool {
        self.issues.read().await.is_empty()
    }
}

#[async_trait]
impl IssueStore for InMemoryIssueStore {
    async fn get(&self, id: IssueId) -> Result<Option<Issue>, StoreError> {
        Ok(self.issues.read().await.get(&id).cloned())
    }

    async fn query_by_reporter(
        &self,
        reporter: &ActorId,
        software_id: Option<SoftwareId>,
    ) -> Result<Vec<Issue>, StoreError> {
        let issues = self.issues.read().await;
        let mut matches: Vec<Issue> = issues
            .values()
            .filter(|issue| &issue.reported_by == reporter)
            .filter(|issue| software_id.is_none_or(|s| issue.software_id == s))
            .cloned()
            .collect();
        matches.sort_by_key(|issue| issue.reported_at);
        Ok(matches)
    }

    async fn insert(&self, issue: Issue) -> Result<(), StoreError> {
        let mut issues = self.issues.write().await;
        if issues.contains_key(&issue.id) {
            return Err(StoreError::AlreadyExists(issue.id));
        }
        issues.insert(issue.id, issue);
        Ok(())
    }

    async fn update(&self, expected_version: u64, issue: Issue) -> Result<Issue, StoreError> {
        let mut issues = self.issues.write().await;
        let Some(stored) = issues.get_mut(&issue.id) else {
            return Err(StoreError::NotFound(issue.id));
        };
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: issue.id,
                expected: expected_version,
                actual: stored.version,
            });
        }
        let mut committed = issue;
        committed.version = expected_version + 1;
        *stored = committed.clone();
        Ok(committed)
    }

    async fn remove(&self, id: IssueId, expected_version: u64) -> Result<(), StoreError> {
        let mut issues = self.issues.write().await;
        let Some(stored) = issues.get(&id) else {
            return Err(StoreError::NotFound(id));
        };
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                actual: stored.version,
            });
        }
        issues.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::IssueStatus;
    use chrono::Utc;

    fn issue_for(reporter: &str, software: SoftwareId) -> Issue {
        Issue::submitted(
            IssueId::new(),
            ActorId::new(reporter),
            software,
            "VPN drops every hour".to_string(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = InMemoryIssueStore::new();
        let issue = issue_for("sue@company.com", SoftwareId::new());

        store.insert(issue.clone()).await.unwrap();
        assert_eq!(store.get(issue.id).await.unwrap(), Some(issue));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryIssueStore::new();
        let issue = issue_for("sue@company.com", SoftwareId::new());

        store.insert(issue.clone()).await.unwrap();
        let err = store.insert(issue).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn conditional_update_stamps_next_version() {
        let store = InMemoryIssueStore::new();
        let issue = issue_for("sue@company.com", SoftwareId::new());
        store.insert(issue.clone()).await.unwrap();

        let mut next = issue.clone();
        next.status = IssueStatus::CancelledByEmployee;
        let committed = store.update(1, next).await.unwrap();

        assert_eq!(committed.version, 2);
        assert_eq!(
            store.get(issue.id).await.unwrap().unwrap().status,
            IssueStatus::CancelledByEmployee
        );
    }

    #[tokio::test]
    async fn stale_update_fails_and_leaves_entity_unchanged() {
        let store = InMemoryIssueStore::new();
        let issue = issue_for("sue@company.com", SoftwareId::new());
        store.insert(issue.clone()).await.unwrap();

        let mut first = issue.clone();
        first.status = IssueStatus::AssignedToTech;
        first.assigned_to = Some(ActorId::new("tim@company.com"));
        store.update(1, first).await.unwrap();

        // Second writer read version 1 before the first committed
        let mut stale = issue.clone();
        stale.status = IssueStatus::CancelledByEmployee;
        let err = store.update(1, stale).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionConflict {
                expected: 1,
                actual: 2,
                ..
            }
        ));

        let stored = store.get(issue.id).await.unwrap().unwrap();
        assert_eq!(stored.status, IssueStatus::AssignedToTech);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn stale_remove_fails() {
        let store = InMemoryIssueStore::new();
        let issue = issue_for("sue@company.com", SoftwareId::new());
        store.insert(issue.clone()).await.unwrap();

        let mut next = issue.clone();
        next.status = IssueStatus::AssignedToTech;
        next.assigned_to = Some(ActorId::new("tim@company.com"));
        store.update(1, next).await.unwrap();

        let err = store.remove(issue.id, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
        assert!(store.get(issue.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_deletes_entity() {
        let store = InMemoryIssueStore::new();
        let issue = issue_for("sue@company.com", SoftwareId::new());
        store.insert(issue.clone()).await.unwrap();

        store.remove(issue.id, 1).await.unwrap();
        assert_eq!(store.get(issue.id).await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn query_by_reporter_scopes_and_filters() {
        let store = InMemoryIssueStore::new();
        let s1 = SoftwareId::new();
        let s2 = SoftwareId::new();

        let a = issue_for("sue@company.com", s1);
        let b = issue_for("sue@company.com", s2);
        let c = issue_for("bob@company.com", s1);
        for issue in [&a, &b, &c] {
            store.insert(issue.clone()).await.unwrap();
        }

        let sue = ActorId::new("sue@company.com");
        let all = store.query_by_reporter(&sue, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|issue| issue.reported_by == sue));

        let filtered = store.query_by_reporter(&sue, Some(s1)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, a.id);
    }
}
