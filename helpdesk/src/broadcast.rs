//! Committed-transition fan-out.
//!
//! After the coordinator commits a transition, the service publishes an
//! [`IssueEvent`] to a named topic. Delivery is best-effort and strictly
//! after commit: a failed publish is logged and never rolls back or retries
//! the state change.
//!
//! Topic selection is role-complement — the side that did not initiate the
//! change is the one that needs to hear about it. A technician's assignment
//! goes to the employee-facing topic; an employee's cancel or delete goes to
//! the technician-facing topic.
//!
//! The default transport is [`TopicBroadcaster`], an in-process fan-out over
//! per-topic `tokio::sync::broadcast` channels. Anything else (socket
//! server, queue, log) can sit behind the [`Broadcaster`] trait without the
//! core noticing.

use crate::types::{ActorId, IssueId, IssueStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Topic for events employees subscribe to.
pub const TOPIC_EMPLOYEE: &str = "employee";
/// Topic for events technicians subscribe to.
pub const TOPIC_TECH: &str = "tech";

/// Default per-topic channel capacity.
const DEFAULT_CAPACITY: usize = 1000;

/// A committed issue transition, as seen by subscribers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IssueEvent {
    /// A technician claimed the issue
    #[serde(rename_all = "camelCase")]
    Assigned {
        /// The claimed issue
        issue_id: IssueId,
        /// The claiming technician
        assigned_to: ActorId,
        /// Status after the transition
        status: IssueStatus,
    },
    /// The reporter cancelled the issue
    #[serde(rename_all = "camelCase")]
    Cancelled {
        /// The cancelled issue
        issue_id: IssueId,
        /// Status after the transition
        status: IssueStatus,
    },
    /// The reporter deleted the issue
    #[serde(rename_all = "camelCase")]
    Deleted {
        /// The removed issue
        issue_id: IssueId,
    },
}

impl IssueEvent {
    /// Role-complement topic for this event.
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::Assigned { .. } => TOPIC_EMPLOYEE,
            Self::Cancelled { .. } | Self::Deleted { .. } => TOPIC_TECH,
        }
    }
}

/// Errors a broadcast transport may report.
///
/// The in-process transport never fails; remote transports (socket server,
/// queue) surface their faults here. Callers log and move on.
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// The underlying transport refused or dropped the publish.
    #[error("broadcast transport error: {0}")]
    Transport(String),
}

/// Best-effort publisher of committed transitions.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Publish `event` to `topic`. Fire-and-forget: no delivery
    /// acknowledgment is required by callers.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError`] if the transport fails; callers must treat
    /// this as a logging matter, never as a reason to roll back.
    async fn publish(&self, topic: &str, event: IssueEvent) -> Result<(), BroadcastError>;
}

/// Type alias for the per-topic channel map.
type ChannelMap = RwLock<HashMap<String, broadcast::Sender<IssueEvent>>>;

/// In-process topic fan-out over `tokio::sync::broadcast` channels.
///
/// Each topic lazily gets its own channel. Publishing to a topic nobody
/// subscribes to is a no-op, which is exactly the best-effort contract.
pub struct TopicBroadcaster {
    channels: ChannelMap,
    capacity: usize,
}

impl TopicBroadcaster {
    /// Create a broadcaster with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a broadcaster with an explicit per-topic channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Subscribe to a topic. Events published after this call are delivered
    /// in publish order.
    pub async fn subscribe(&self, topic: impl Into<String>) -> broadcast::Receiver<IssueEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(topic.into())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of topics with a live channel.
    pub async fn topic_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for TopicBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broadcaster for TopicBroadcaster {
    async fn publish(&self, topic: &str, event: IssueEvent) -> Result<(), BroadcastError> {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);

        // No receivers is fine: best-effort means nobody listening loses
        // nothing they asked for
        let _ = sender.send(event);
        Ok(())
    }
}
