//! Error taxonomy for the event rules engine.

use thiserror::Error;
use uuid::Uuid;

use crate::models::RegistrationStatus;

/// Message surfaced for a duplicate club name.
pub const CLUB_NAME_TAKEN: &str = "This club name is already taken.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The operation needed a known acting user or club and none was available.
    #[error("Identity required: {0}")]
    Identity(String),

    #[error("Cannot change registration status from {from} to {to}")]
    InvalidTransition {
        from: RegistrationStatus,
        to: RegistrationStatus,
    },

    /// An edited limit would fall below the registrations already taken.
    #[error("Limit cannot be lower than current registrations ({current} registered, limit {limit})")]
    CapacityViolation { limit: i32, current: i64 },

    #[error("Event is full ({limit} registrations)")]
    CapacityExceeded { limit: i32 },

    #[error("Registrations are not open for this event (status {status})")]
    NotEligible { status: RegistrationStatus },

    #[error("Only the account that registered may edit this registration")]
    NotOwner,

    #[error("Registration details have already been edited once")]
    AlreadyEdited,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Identity exists without its organizer profile; needs manual cleanup.
    #[error(
        "Organizer identity {identity_id} ({email}) was created but its profile was not: {reason}. \
         Remove this identity manually before retrying."
    )]
    PartialProvisioning {
        identity_id: Uuid,
        email: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    /// True for rule violations that leave state unchanged and can be shown to the user as-is.
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidTransition { .. }
                | DomainError::CapacityViolation { .. }
                | DomainError::CapacityExceeded { .. }
                | DomainError::NotEligible { .. }
                | DomainError::NotOwner
                | DomainError::AlreadyEdited
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            DomainError::InvalidTransition {
                from: RegistrationStatus::Closed,
                to: RegistrationStatus::Open
            }
            .to_string(),
            "Cannot change registration status from CLOSED to OPEN"
        );
        assert_eq!(
            DomainError::NotFound("Event".to_string()).to_string(),
            "Event not found"
        );
        assert_eq!(
            DomainError::Conflict(CLUB_NAME_TAKEN.to_string()).to_string(),
            CLUB_NAME_TAKEN
        );
    }

    #[test]
    fn test_partial_provisioning_names_identity() {
        let id = Uuid::new_v4();
        let err = DomainError::PartialProvisioning {
            identity_id: id,
            email: "chess@college.edu".to_string(),
            reason: "profile store offline".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains(&id.to_string()));
        assert!(message.contains("chess@college.edu"));
        assert!(message.contains("manually"));
    }

    #[test]
    fn test_rule_violations() {
        assert!(DomainError::AlreadyEdited.is_rule_violation());
        assert!(DomainError::CapacityExceeded { limit: 1 }.is_rule_violation());
        assert!(!DomainError::Storage("down".to_string()).is_rule_violation());
        assert!(!DomainError::Conflict("dup".to_string()).is_rule_violation());
    }
}
