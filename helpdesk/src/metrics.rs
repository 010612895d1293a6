//! Business metrics for the help-desk service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `helpdesk_issues_created_total` - Issues submitted
//! - `helpdesk_issues_assigned_total` - Issues claimed by a technician
//! - `helpdesk_issues_cancelled_total` - Issues cancelled by their reporter
//! - `helpdesk_issues_deleted_total` - Issues deleted by their reporter
//! - `helpdesk_lifecycle_rejections_total{kind}` - Refused transitions

use crate::types::{ActorId, IssueId, SoftwareId};
use metrics::{counter, describe_counter};

/// Register metric descriptions.
///
/// Call once at application startup, before any metrics are recorded.
pub fn register_helpdesk_metrics() {
    describe_counter!(
        "helpdesk_issues_created_total",
        "Total number of issues submitted by employees"
    );
    describe_counter!(
        "helpdesk_issues_assigned_total",
        "Total number of issues claimed by a technician"
    );
    describe_counter!(
        "helpdesk_issues_cancelled_total",
        "Total number of issues cancelled by their reporter"
    );
    describe_counter!(
        "helpdesk_issues_deleted_total",
        "Total number of issues deleted by their reporter"
    );
    describe_counter!(
        "helpdesk_lifecycle_rejections_total",
        "Total number of refused lifecycle transitions, by rejection kind"
    );

    tracing::info!("Help-desk metrics registered");
}

/// Metrics sink for issue lifecycle operations.
#[derive(Clone, Copy, Debug, Default)]
pub struct IssueMetrics;

impl IssueMetrics {
    /// Create a sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Record a submitted issue.
    pub fn issue_created(&self, reporter: &ActorId, id: IssueId, software_id: SoftwareId) {
        counter!("helpdesk_issues_created_total").increment(1);
        tracing::debug!(%reporter, issue_id = %id, %software_id, "issue created metric recorded");
    }

    /// Record a claimed issue.
    pub fn issue_assigned(&self, id: IssueId) {
        counter!("helpdesk_issues_assigned_total").increment(1);
        tracing::debug!(issue_id = %id, "issue assigned metric recorded");
    }

    /// Record a cancelled issue.
    pub fn issue_cancelled(&self, id: IssueId) {
        counter!("helpdesk_issues_cancelled_total").increment(1);
        tracing::debug!(issue_id = %id, "issue cancelled metric recorded");
    }

    /// Record a deleted issue.
    pub fn issue_deleted(&self, id: IssueId) {
        counter!("helpdesk_issues_deleted_total").increment(1);
        tracing::debug!(issue_id = %id, "issue deleted metric recorded");
    }

    /// Record a refused transition.
    pub fn rejection(&self, kind: &'static str) {
        counter!("helpdesk_lifecycle_rejections_total", "kind" => kind).increment(1);
    }
}
