//! Sign-up, sign-in and session routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::Identity;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentIdentity, CurrentSession};
use crate::services::auth::AuthSession;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Strength rules are enforced by the auth service
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokensResponse {
    fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: Identity,
    pub tokens: TokensResponse,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.identity,
            tokens: TokensResponse::bearer(
                session.access_token,
                session.refresh_token,
                session.expires_in,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSessionResponse {
    pub user: Identity,
}

/// Public self sign-up; always creates a participant.
///
/// POST /api/v1/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    request.validate()?;

    let session = state.auth.sign_up(&request.email, &request.password).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    request.validate()?;

    let session = state
        .auth
        .sign_in_with_password(&request.email, &request.password)
        .await?;
    Ok(Json(session.into()))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokensResponse>, ApiError> {
    request.validate()?;

    let result = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(TokensResponse::bearer(
        result.access_token,
        result.refresh_token,
        result.expires_in,
    )))
}

/// The signed-in identity with its current role and club.
///
/// GET /api/v1/auth/session
pub async fn session(CurrentIdentity(identity): CurrentIdentity) -> Json<CurrentSessionResponse> {
    Json(CurrentSessionResponse { user: identity })
}

/// POST /api/v1/auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<StatusCode, ApiError> {
    state.auth.sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
