//! Broadcast integration tests.
//!
//! Verifies topic routing end to end through the service: each committed
//! transition lands on the topic of the *other* role, events only exist for
//! commits, and a subscriber that receives an event can read the matching
//! state back from the store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use helpdesk::broadcast::{IssueEvent, TopicBroadcaster, TOPIC_EMPLOYEE, TOPIC_TECH};
use helpdesk::metrics::IssueMetrics;
use helpdesk::service::IssueService;
use helpdesk::service::SubmitIssue;
use helpdesk::store::{InMemoryIssueStore, IssueStore};
use helpdesk::types::{Actor, IssueStatus, SoftwareId, SystemClock};
use std::sync::Arc;

struct Fixture {
    service: Arc<IssueService>,
    store: Arc<InMemoryIssueStore>,
    broadcaster: Arc<TopicBroadcaster>,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryIssueStore::new());
    let broadcaster = Arc::new(TopicBroadcaster::new());
    let service = Arc::new(IssueService::new(
        store.clone(),
        broadcaster.clone(),
        IssueMetrics::new(),
        Arc::new(SystemClock),
    ));
    Fixture {
        service,
        store,
        broadcaster,
    }
}

fn submission() -> SubmitIssue {
    SubmitIssue {
        software_id: SoftwareId::new(),
        description: "Monitor flickers after the latest driver update".to_string(),
    }
}

#[tokio::test]
async fn assignment_notifies_employees_not_technicians() {
    let f = fixture();
    let reporter = Actor::employee("sue@company.com");
    let tech = Actor::technician("tim@company.com");
    let mut employee_rx = f.broadcaster.subscribe(TOPIC_EMPLOYEE).await;
    let mut tech_rx = f.broadcaster.subscribe(TOPIC_TECH).await;

    let issue = f.service.submit(submission(), &reporter).await.unwrap();
    // Submission itself is not broadcast
    assert!(employee_rx.try_recv().is_err());
    assert!(tech_rx.try_recv().is_err());

    f.service.assign(issue.id, &tech).await.unwrap();

    let event = employee_rx.try_recv().unwrap();
    assert_eq!(
        event,
        IssueEvent::Assigned {
            issue_id: issue.id,
            assigned_to: tech.id.clone(),
            status: IssueStatus::AssignedToTech,
        }
    );
    assert!(tech_rx.try_recv().is_err(), "tech topic stays quiet on assign");
}

#[tokio::test]
async fn cancellation_notifies_technicians_not_employees() {
    let f = fixture();
    let reporter = Actor::employee("sue@company.com");
    let mut employee_rx = f.broadcaster.subscribe(TOPIC_EMPLOYEE).await;
    let mut tech_rx = f.broadcaster.subscribe(TOPIC_TECH).await;

    let issue = f.service.submit(submission(), &reporter).await.unwrap();
    f.service.cancel(issue.id, &reporter).await.unwrap();

    let event = tech_rx.try_recv().unwrap();
    assert_eq!(
        event,
        IssueEvent::Cancelled {
            issue_id: issue.id,
            status: IssueStatus::CancelledByEmployee,
        }
    );
    assert!(employee_rx.try_recv().is_err());
}

#[tokio::test]
async fn deletion_notifies_technicians() {
    let f = fixture();
    let reporter = Actor::employee("sue@company.com");
    let mut tech_rx = f.broadcaster.subscribe(TOPIC_TECH).await;

    let issue = f.service.submit(submission(), &reporter).await.unwrap();
    f.service.delete(issue.id, &reporter).await.unwrap();

    assert_eq!(
        tech_rx.try_recv().unwrap(),
        IssueEvent::Deleted { issue_id: issue.id }
    );
}

#[tokio::test]
async fn rejected_transitions_produce_no_events() {
    let f = fixture();
    let reporter = Actor::employee("sue@company.com");
    let stranger = Actor::employee("bob@company.com");
    let tech = Actor::technician("tim@company.com");
    let mut employee_rx = f.broadcaster.subscribe(TOPIC_EMPLOYEE).await;
    let mut tech_rx = f.broadcaster.subscribe(TOPIC_TECH).await;

    let issue = f.service.submit(submission(), &reporter).await.unwrap();

    assert!(f.service.cancel(issue.id, &stranger).await.is_err());
    assert!(f.service.assign(issue.id, &stranger).await.is_err());
    f.service.assign(issue.id, &tech).await.unwrap();
    let _ = employee_rx.try_recv().unwrap();
    assert!(f.service.delete(issue.id, &reporter).await.is_err());

    assert!(employee_rx.try_recv().is_err());
    assert!(tech_rx.try_recv().is_err());
}

#[tokio::test]
async fn event_is_published_after_the_commit_is_readable() {
    let f = fixture();
    let reporter = Actor::employee("sue@company.com");
    let tech = Actor::technician("tim@company.com");
    let mut employee_rx = f.broadcaster.subscribe(TOPIC_EMPLOYEE).await;

    let issue = f.service.submit(submission(), &reporter).await.unwrap();
    f.service.assign(issue.id, &tech).await.unwrap();

    // By the time the event is observable, the store already holds the state
    // the event describes.
    let event = employee_rx.try_recv().unwrap();
    let stored = f.store.get(issue.id).await.unwrap().unwrap();
    if let IssueEvent::Assigned {
        issue_id,
        assigned_to,
        status,
    } = event
    {
        assert_eq!(issue_id, stored.id);
        assert_eq!(Some(assigned_to), stored.assigned_to);
        assert_eq!(status, stored.status);
    } else {
        panic!("expected an assigned event");
    }
}

#[tokio::test]
async fn events_for_one_subscriber_arrive_in_commit_order() {
    let f = fixture();
    let reporter = Actor::employee("sue@company.com");
    let mut tech_rx = f.broadcaster.subscribe(TOPIC_TECH).await;

    let first = f.service.submit(submission(), &reporter).await.unwrap();
    let second = f.service.submit(submission(), &reporter).await.unwrap();
    f.service.cancel(first.id, &reporter).await.unwrap();
    f.service.cancel(second.id, &reporter).await.unwrap();

    let order: Vec<_> = [tech_rx.try_recv().unwrap(), tech_rx.try_recv().unwrap()]
        .into_iter()
        .map(|event| match event {
            IssueEvent::Cancelled { issue_id, .. } => issue_id,
            other => panic!("unexpected event: {other:?}"),
        })
        .collect();
    assert_eq!(order, vec![first.id, second.id]);
}

#[tokio::test]
async fn publishing_without_subscribers_does_not_disturb_the_commit() {
    let f = fixture();
    let reporter = Actor::employee("sue@company.com");

    let issue = f.service.submit(submission(), &reporter).await.unwrap();
    // Nobody subscribed to the employee topic; the claim still commits.
    let assigned = f
        .service
        .assign(issue.id, &Actor::technician("tim@company.com"))
        .await
        .unwrap();
    assert_eq!(assigned.status, IssueStatus::AssignedToTech);
}
