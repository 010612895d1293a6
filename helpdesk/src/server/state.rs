//! Application state shared across HTTP handlers.

use crate::auth::ResolveActor;
use crate::service::IssueService;
use std::sync::Arc;

/// Shared state handed to every handler.
///
/// Cloned (cheaply, via `Arc`) per request. Holds the issue service and the
/// identity resolver; everything else the handlers need flows through the
/// service.
#[derive(Clone)]
pub struct AppState {
    /// Issue lifecycle service
    pub service: Arc<IssueService>,
    /// Credential-to-actor resolver
    pub resolver: Arc<dyn ResolveActor>,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub fn new(service: Arc<IssueService>, resolver: Arc<dyn ResolveActor>) -> Self {
        Self { service, resolver }
    }
}
