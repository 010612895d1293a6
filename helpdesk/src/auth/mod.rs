//! Caller identity.
//!
//! Identity resolution is a collaborator: a credential comes in on the
//! `Authorization` header and the [`resolver::ResolveActor`] seam turns it
//! into an [`crate::types::Actor`]. The default resolver is an in-memory
//! token registry seeded from configuration; a real deployment would put an
//! OIDC/JWT validator behind the same trait.

pub mod middleware;
pub mod resolver;

pub use middleware::{AuthenticatedActor, BearerToken};
pub use resolver::{ResolveActor, ResolveError, TokenRegistry};
