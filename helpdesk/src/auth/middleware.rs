//! Axum extractors for caller identity.
//!
//! [`BearerToken`] pulls the raw credential off the `Authorization` header;
//! [`AuthenticatedActor`] resolves it through the application's
//! [`crate::auth::ResolveActor`] and hands the handler a ready [`Actor`].
//!
//! ```rust,ignore
//! async fn handler(AuthenticatedActor(actor): AuthenticatedActor) -> ... {
//!     // actor.id / actor.role are guaranteed resolved
//! }
//! ```

use crate::api::error::ApiError;
use crate::server::state::AppState;
use crate::types::Actor;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Bearer token extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                ApiError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?
            .to_string();

        if token.is_empty() {
            return Err(ApiError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token))
    }
}

/// Resolved caller identity.
///
/// Use as a handler parameter to require a recognized credential.
#[derive(Debug, Clone)]
pub struct AuthenticatedActor(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let actor = state
            .resolver
            .resolve(&token)
            .await
            .map_err(|_| ApiError::unauthorized("Unknown credential"))?;

        Ok(Self(actor))
    }
}
