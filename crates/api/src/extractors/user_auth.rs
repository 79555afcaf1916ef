//! Extractors for the identity resolved by `require_user_auth`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Identity;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::bearer_token;
use crate::services::auth::AuthenticatedSession;

/// The signed-in identity.
///
/// Prefers the value the middleware stored; on routes without the
/// middleware it resolves the bearer token itself.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

/// The live session behind the request, needed for sign-out.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub AuthenticatedSession);

async fn resolve(parts: &Parts, state: &AppState) -> Result<AuthenticatedSession, ApiError> {
    if let Some(session) = parts.extensions.get::<AuthenticatedSession>() {
        return Ok(session.clone());
    }

    let token = bearer_token(&parts.headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    Ok(state.auth.authenticate(token).await?)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(CurrentIdentity(identity.clone()));
        }
        resolve(parts, state)
            .await
            .map(|session| CurrentIdentity(session.identity))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await.map(CurrentSession)
    }
}
