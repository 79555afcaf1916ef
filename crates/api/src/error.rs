use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A business rule refused the operation; nothing changed.
    #[error("Rule violation ({code}): {message}")]
    RuleViolation {
        code: &'static str,
        message: String,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Option<Vec<ValidationDetail>>,
    },

    #[error("Rate limited")]
    RateLimited,

    /// Server-side failure whose message the operator needs to see.
    #[error("Partial failure: {0}")]
    PartialFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::RuleViolation { code, message } => {
                (StatusCode::CONFLICT, code, message, None)
            }
            ApiError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
                None,
            ),
            ApiError::PartialFailure(msg) => {
                tracing::error!("Partial failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "partial_provisioning",
                    msg,
                    None,
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::Identity(_) => ApiError::Unauthorized(message),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::NotOwner => ApiError::Forbidden(message),
            DomainError::NotFound(_) => ApiError::NotFound(message),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::InvalidTransition { .. } => ApiError::RuleViolation {
                code: "invalid_transition",
                message,
            },
            DomainError::CapacityViolation { .. } => ApiError::RuleViolation {
                code: "capacity_violation",
                message,
            },
            DomainError::CapacityExceeded { .. } => ApiError::RuleViolation {
                code: "capacity_exceeded",
                message,
            },
            DomainError::NotEligible { .. } => ApiError::RuleViolation {
                code: "not_eligible",
                message,
            },
            DomainError::AlreadyEdited => ApiError::RuleViolation {
                code: "already_edited",
                message,
            },
            DomainError::PartialProvisioning { .. } => ApiError::PartialFailure(message),
            DomainError::Validation(msg) => ApiError::validation(msg),
            DomainError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".into())
            }
            AuthError::InvalidToken | AuthError::SessionNotFound => {
                ApiError::Unauthorized("Invalid or expired token".into())
            }
            AuthError::TokenExpired => ApiError::Unauthorized("Token has expired".into()),
            AuthError::EmailTaken => {
                ApiError::Conflict("An account with this email already exists.".into())
            }
            AuthError::WeakPassword(msg) => ApiError::validation(msg),
            AuthError::Domain(e) => e.into(),
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation {
            message,
            details: Some(details),
        }
    }
}
