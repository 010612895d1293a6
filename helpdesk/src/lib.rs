//! Help-desk issue tracking service.
//!
//! Employees submit support issues; technicians claim them; status changes
//! fan out to the role that did not initiate them. The hard part is the
//! issue lifecycle: a ticket must never be double-assigned under concurrent
//! claims, every mutation is authorization-scoped and state-gated, and
//! subscribers observe committed transitions in per-ticket causal order.
//!
//! # Architecture
//!
//! ```text
//! HTTP handlers (api)          thin adapters, per-endpoint status mapping
//!        │
//! IssueService (service)       composition root, after-commit broadcast
//!        │
//! AssignmentCoordinator        read → decide → conditional write,
//! (coordinator)                one re-check on a lost race
//!    │        │
//! lifecycle  IssueStore        pure transition table / narrow repository
//! (pure)     (store)           with optimistic concurrency
//!
//! NotificationBroadcaster (broadcast): best-effort topic fan-out,
//! invoked only after commit, failures logged and swallowed.
//! ```
//!
//! # Concurrency
//!
//! No global lock. The per-ticket entity record is the only shared mutable
//! resource; concurrent writers are linearized by the store's conditional
//! write, keyed on the version read before deciding. Among N simultaneous
//! `assign` calls on one ticket, exactly one commits; the rest observe a
//! rejection consistent with the committed state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod config;
pub mod coordinator;
pub mod lifecycle;
pub mod metrics;
pub mod server;
pub mod service;
pub mod store;
pub mod types;

pub use broadcast::{Broadcaster, IssueEvent, TopicBroadcaster};
pub use config::Config;
pub use coordinator::AssignmentCoordinator;
pub use lifecycle::{decide, IssueAction, Rejection, Transition};
pub use service::{IssueService, ServiceError, SubmitIssue};
pub use store::{InMemoryIssueStore, IssueStore, StoreError};
pub use types::{Actor, ActorId, Issue, IssueId, IssueStatus, Role, SoftwareId};
