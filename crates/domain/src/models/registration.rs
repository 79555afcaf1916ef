//! Registration domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

/// A participant's signup for one event.
///
/// `email` is what the registrant typed; `user_email` is the signed-in
/// account that submitted the form. Only `user_email` decides ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub college: String,
    pub reference_id: String,
    /// File name of the payment screenshot; nothing is uploaded.
    pub payment_evidence: String,
    pub details_edited: bool,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// Form fields are kept as submitted apart from trimming the email.
    /// Only `user_email` is lowercased.
    pub fn new(event_id: Uuid, details: RegistrantDetails, user_email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            name: details.name,
            email: details.email.trim().to_string(),
            college: details.college,
            reference_id: details.reference_id,
            payment_evidence: details.payment_evidence,
            details_edited: false,
            user_email: shared::validation::normalize_email(user_email),
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.user_email == shared::validation::normalize_email(email)
    }

    /// Ownership is checked before the one-shot flag.
    pub fn check_editable_by(&self, requester_email: &str) -> Result<(), DomainError> {
        if !self.is_owned_by(requester_email) {
            return Err(DomainError::NotOwner);
        }
        if self.details_edited {
            return Err(DomainError::AlreadyEdited);
        }
        Ok(())
    }

    /// Applies the single permitted correction and flips `details_edited`.
    pub fn apply_edit(
        &mut self,
        edit: RegistrationEdit,
        requester_email: &str,
    ) -> Result<(), DomainError> {
        self.check_editable_by(requester_email)?;
        self.name = edit.name;
        self.college = edit.college;
        self.details_edited = true;
        Ok(())
    }
}

/// Form fields submitted with a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantDetails {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(min = 1, max = 200, message = "College must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub college: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Reference ID must be at most 100 characters"))]
    pub reference_id: String,

    #[serde(default)]
    #[validate(
        length(max = 255, message = "Payment evidence must be at most 255 characters"),
        custom(function = "shared::validation::validate_file_name")
    )]
    pub payment_evidence: String,
}

/// The one-shot correction: registrant name and college only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEdit {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(
        length(min = 1, max = 200, message = "College must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub college: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> RegistrantDetails {
        RegistrantDetails {
            name: "Ada Lovelace".to_string(),
            email: "Ada@Mail.com".to_string(),
            college: "Analytical College".to_string(),
            reference_id: "UPI-123".to_string(),
            payment_evidence: "receipt.png".to_string(),
        }
    }

    fn edit(college: &str) -> RegistrationEdit {
        RegistrationEdit {
            name: "Ada Lovelace".to_string(),
            college: college.to_string(),
        }
    }

    #[test]
    fn test_new_registration_starts_unedited() {
        let registration = Registration::new(Uuid::new_v4(), details(), "A@X.com");
        assert!(!registration.details_edited);
        assert_eq!(registration.user_email, "a@x.com");
        assert_eq!(registration.email, "Ada@Mail.com");
    }

    #[test]
    fn test_new_registration_keeps_fields_as_submitted() {
        let submitted = RegistrantDetails {
            name: "  Smith, John ".to_string(),
            email: " John.Smith@Gmail.com ".to_string(),
            college: " St. Xavier's ".to_string(),
            reference_id: " UPI-0042".to_string(),
            payment_evidence: "receipt.png ".to_string(),
        };
        let registration = Registration::new(Uuid::new_v4(), submitted, " A@X.com ");

        assert_eq!(registration.name, "  Smith, John ");
        assert_eq!(registration.email, "John.Smith@Gmail.com");
        assert_eq!(registration.college, " St. Xavier's ");
        assert_eq!(registration.reference_id, " UPI-0042");
        assert_eq!(registration.payment_evidence, "receipt.png ");
        assert_eq!(registration.user_email, "a@x.com");
        assert!(registration.is_owned_by("a@X.COM"));
    }

    #[test]
    fn test_edit_once_then_already_edited() {
        let mut registration = Registration::new(Uuid::new_v4(), details(), "a@x.com");

        registration.apply_edit(edit("New College"), "a@x.com").unwrap();
        assert!(registration.details_edited);
        assert_eq!(registration.college, "New College");

        let second = registration.apply_edit(edit("Other College"), "a@x.com");
        assert!(matches!(second, Err(DomainError::AlreadyEdited)));
        assert_eq!(registration.college, "New College");
    }

    #[test]
    fn test_edit_by_other_user_is_not_owner() {
        let mut registration = Registration::new(Uuid::new_v4(), details(), "a@x.com");
        let result = registration.apply_edit(edit("New College"), "b@x.com");

        assert!(matches!(result, Err(DomainError::NotOwner)));
        assert!(!registration.details_edited);
    }

    #[test]
    fn test_ownership_checked_before_edit_flag() {
        let mut registration = Registration::new(Uuid::new_v4(), details(), "a@x.com");
        registration.details_edited = true;

        assert!(matches!(
            registration.check_editable_by("b@x.com"),
            Err(DomainError::NotOwner)
        ));
    }

    #[test]
    fn test_registrant_details_validation() {
        assert!(details().validate().is_ok());

        let mut missing_college = details();
        missing_college.college = " ".to_string();
        assert!(missing_college.validate().is_err());

        let mut bad_email = details();
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());

        let mut path = details();
        path.payment_evidence = "../secret.png".to_string();
        assert!(path.validate().is_err());
    }
}
