//! Concurrency tests for the assignment path.
//!
//! Drives the service from many tasks at once and asserts the version gate
//! holds: exactly one claim commits, every loser observes the committed
//! state, and the stored entity moves through exactly one version bump.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use helpdesk::broadcast::TopicBroadcaster;
use helpdesk::lifecycle::Rejection;
use helpdesk::metrics::IssueMetrics;
use helpdesk::service::{IssueService, ServiceError, SubmitIssue};
use helpdesk::store::{InMemoryIssueStore, IssueStore};
use helpdesk::types::{Actor, SoftwareId, SystemClock};
use std::sync::Arc;

fn service_with_store() -> (Arc<IssueService>, Arc<InMemoryIssueStore>) {
    let store = Arc::new(InMemoryIssueStore::new());
    let service = Arc::new(IssueService::new(
        store.clone(),
        Arc::new(TopicBroadcaster::new()),
        IssueMetrics::new(),
        Arc::new(SystemClock),
    ));
    (service, store)
}

fn submission() -> SubmitIssue {
    SubmitIssue {
        software_id: SoftwareId::new(),
        description: "VPN client disconnects every few minutes".to_string(),
    }
}

#[tokio::test]
async fn concurrent_claims_admit_exactly_one_technician() {
    let (service, store) = service_with_store();
    let reporter = Actor::employee("sue@company.com");
    let issue = service.submit(submission(), &reporter).await.unwrap();

    let techs = 8;
    let mut handles = Vec::with_capacity(techs);
    for n in 0..techs {
        let service = service.clone();
        let tech = Actor::technician(format!("tech-{n}@company.com"));
        handles.push(tokio::spawn(async move {
            service.assign(issue.id, &tech).await
        }));
    }

    let mut winners = Vec::new();
    let mut losses = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(assigned) => winners.push(assigned),
            Err(ServiceError::Rejected(Rejection::AlreadyAssigned { status })) => {
                assert_eq!(status.to_string(), "AssignedToTech");
                losses += 1;
            }
            Err(other) => panic!("unexpected rejection under contention: {other}"),
        }
    }

    assert_eq!(winners.len(), 1, "exactly one claim must commit");
    assert_eq!(losses, techs - 1);

    // Stored entity matches the winner and advanced one version
    let stored = store.get(issue.id).await.unwrap().unwrap();
    assert_eq!(stored.assigned_to, winners[0].assigned_to);
    assert_eq!(stored.version, 2);
    assert!(stored.assignment_invariant_holds());
}

#[tokio::test]
async fn concurrent_claim_and_cancel_commit_exactly_one_outcome() {
    let (service, store) = service_with_store();
    let reporter = Actor::employee("sue@company.com");
    let tech = Actor::technician("tim@company.com");
    let issue = service.submit(submission(), &reporter).await.unwrap();

    let assign = {
        let service = service.clone();
        tokio::spawn(async move { service.assign(issue.id, &tech).await })
    };
    let cancel = {
        let service = service.clone();
        let reporter = reporter.clone();
        tokio::spawn(async move { service.cancel(issue.id, &reporter).await })
    };

    let assign = assign.await.unwrap();
    let cancel = cancel.await.unwrap();
    assert_ne!(
        assign.is_ok(),
        cancel.is_ok(),
        "one of the racing actions must win and the other must lose"
    );

    let stored = store.get(issue.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    if assign.is_ok() {
        assert_eq!(stored.status.to_string(), "AssignedToTech");
    } else {
        assert_eq!(stored.status.to_string(), "CancelledByEmployee");
        assert!(matches!(
            assign,
            Err(ServiceError::Rejected(Rejection::InvalidState { .. }))
        ));
    }
}

#[tokio::test]
async fn losers_observe_committed_state_not_their_stale_read() {
    let (service, store) = service_with_store();
    let reporter = Actor::employee("sue@company.com");
    let issue = service.submit(submission(), &reporter).await.unwrap();

    service
        .assign(issue.id, &Actor::technician("tim@company.com"))
        .await
        .unwrap();

    // A cancel arriving after the claim is judged against the new state
    let result = service.cancel(issue.id, &reporter).await;
    assert!(matches!(
        result,
        Err(ServiceError::Rejected(Rejection::InvalidState { status }))
            if status.to_string() == "AssignedToTech"
    ));

    let stored = store.get(issue.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 2, "rejected cancel must not bump the version");
}

#[tokio::test]
async fn concurrent_delete_and_claim_settle_on_one_outcome() {
    let (service, store) = service_with_store();
    let reporter = Actor::employee("sue@company.com");
    let tech = Actor::technician("tara@company.com");
    let issue = service.submit(submission(), &reporter).await.unwrap();

    let assign = {
        let service = service.clone();
        tokio::spawn(async move { service.assign(issue.id, &tech).await })
    };
    let delete = {
        let service = service.clone();
        let reporter = reporter.clone();
        tokio::spawn(async move { service.delete(issue.id, &reporter).await })
    };

    let assign = assign.await.unwrap();
    let delete = delete.await.unwrap();
    assert_ne!(assign.is_ok(), delete.is_ok());

    match store.get(issue.id).await.unwrap() {
        Some(stored) => {
            assert!(assign.is_ok());
            assert_eq!(stored.status.to_string(), "AssignedToTech");
            assert_eq!(stored.version, 2);
        }
        None => assert!(delete.is_ok()),
    }
}

#[tokio::test]
async fn repeated_races_never_double_commit() {
    // Run the two-way race many times; whatever interleaving the scheduler
    // picks, the entity must never show signs of both actions landing.
    for _ in 0..25 {
        let (service, store) = service_with_store();
        let reporter = Actor::employee("sue@company.com");
        let issue = service.submit(submission(), &reporter).await.unwrap();

        let a = {
            let service = service.clone();
            let tech = Actor::technician("tim@company.com");
            tokio::spawn(async move { service.assign(issue.id, &tech).await })
        };
        let b = {
            let service = service.clone();
            let tech = Actor::technician("tara@company.com");
            tokio::spawn(async move { service.assign(issue.id, &tech).await })
        };

        let a = a.await.unwrap();
        let b = b.await.unwrap();
        assert!(a.is_ok() ^ b.is_ok());

        let stored = store.get(issue.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert!(stored.assignment_invariant_holds());
    }
}
