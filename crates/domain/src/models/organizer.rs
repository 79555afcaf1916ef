//! Organizer profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Administrative record linking a club name to an organizer identity.
///
/// `id` equals the identity's account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerProfile {
    pub id: Uuid,
    pub club_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Request to provision a new organizer (identity + profile).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizerRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(custom(function = "shared::validation::validate_club_name"))]
    pub club_name: String,
}

/// Only the club name of an organizer can be changed.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizerRequest {
    #[validate(custom(function = "shared::validation::validate_club_name"))]
    pub club_name: String,
}

/// Result of renaming an organizer's club.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOutcome {
    pub profile: OrganizerProfile,
    /// False when the profile changed but the identity metadata did not.
    pub metadata_synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_organizer_request_validation() {
        let request = CreateOrganizerRequest {
            email: "robotics@college.edu".to_string(),
            password: "Organizer1".to_string(),
            club_name: "Robotics Club".to_string(),
        };
        assert!(request.validate().is_ok());

        let bad = CreateOrganizerRequest {
            email: "robotics".to_string(),
            password: "short".to_string(),
            club_name: "".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("club_name"));
    }

    #[test]
    fn test_rename_outcome_omits_warning_when_synced() {
        let outcome = RenameOutcome {
            profile: OrganizerProfile {
                id: Uuid::nil(),
                club_name: "Drama".to_string(),
                email: "drama@college.edu".to_string(),
                created_at: Utc::now(),
            },
            metadata_synced: true,
            warning: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["metadataSynced"], true);
        assert!(json.get("warning").is_none());
        assert_eq!(json["profile"]["clubName"], "Drama");
    }
}
