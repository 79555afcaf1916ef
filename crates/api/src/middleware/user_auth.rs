//! Bearer-token authentication middleware.
//!
//! Every authenticated request resolves its identity from the live session,
//! so role and club changes apply on the next request.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{Identity, Role};
use serde_json::json;

use crate::app::AppState;
use crate::services::auth::AuthError;

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req_headers: &axum::http::HeaderMap) -> Option<&str> {
    req_headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects requests without a live session. Inserts both the
/// [`AuthenticatedSession`](crate::services::auth::AuthenticatedSession)
/// and its [`Identity`] into the request extensions.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    match state.auth.authenticate(token).await {
        Ok(session) => {
            req.extensions_mut().insert(session.identity.clone());
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(AuthError::Internal(e)) => {
            tracing::error!(error = %e, "Session lookup failed");
            internal_error_response("Authentication service unavailable")
        }
        Err(AuthError::Domain(e)) => {
            tracing::error!(error = %e, "Session lookup failed");
            internal_error_response("Authentication service unavailable")
        }
        Err(e) => {
            tracing::debug!(error = %e, "Authentication rejected");
            unauthorized_response("Invalid or expired token")
        }
    }
}

/// Admits only `ADMIN` identities. Must run after [`require_user_auth`].
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<Identity>() {
        Some(identity) if identity.role == Role::Admin => next.run(req).await,
        Some(identity) => {
            tracing::warn!(
                user_id = %identity.user_id,
                role = %identity.role,
                path = %req.uri().path(),
                "Admin route refused"
            );
            forbidden_response("Access Denied")
        }
        None => unauthorized_response("Authentication required"),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

fn forbidden_response(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": message
        })),
    )
        .into_response()
}

fn internal_error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}
