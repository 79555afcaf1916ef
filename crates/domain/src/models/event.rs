//! Event domain models and the registration-status state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

/// Whether an event currently accepts registrations.
///
/// ```text
/// OPEN  <-> PAUSED
/// OPEN   -> CLOSED
/// PAUSED -> CLOSED
/// ```
/// CLOSED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationStatus {
    Open,
    Paused,
    Closed,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Open => "OPEN",
            RegistrationStatus::Paused => "PAUSED",
            RegistrationStatus::Closed => "CLOSED",
        }
    }

    pub fn can_transition_to(self, next: RegistrationStatus) -> bool {
        use RegistrationStatus::*;
        matches!(
            (self, next),
            (Open, Paused) | (Paused, Open) | (Open, Closed) | (Paused, Closed)
        )
    }

    /// Returns `next` when the move is allowed, `InvalidTransition` otherwise.
    pub fn transition_to(self, next: RegistrationStatus) -> Result<Self, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn accepts_registrations(self) -> bool {
        self == RegistrationStatus::Open
    }

    pub fn is_terminal(self) -> bool {
        self == RegistrationStatus::Closed
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(RegistrationStatus::Open),
            "PAUSED" => Ok(RegistrationStatus::Paused),
            "CLOSED" => Ok(RegistrationStatus::Closed),
            _ => Err(format!("Unknown registration status: {}", s)),
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
    pub schedule: String,
    pub venue: String,
    pub rules: String,
    pub contact: String,
    pub club_name: String,
    pub organizer_id: Uuid,
    /// `None` means unlimited.
    pub max_registrations: Option<i32>,
    pub registration_status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// True when a capacity is set and `count` has reached it.
    pub fn is_full(&self, count: i64) -> bool {
        matches!(self.max_registrations, Some(limit) if count >= i64::from(limit))
    }

    pub fn is_managed_by(&self, user_id: Uuid) -> bool {
        self.organizer_id == user_id
    }

    /// Overwrites the organizer-editable fields.
    pub fn apply_details(&mut self, details: EventDetails) {
        self.title = details.title.trim().to_string();
        self.date = details.date;
        self.description = details.description;
        self.schedule = details.schedule;
        self.venue = details.venue.trim().to_string();
        self.rules = details.rules;
        self.contact = details.contact.trim().to_string();
        self.max_registrations = details.max_registrations;
        self.updated_at = Utc::now();
    }
}

/// Fields an organizer supplies when creating or editing an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    pub date: NaiveDate,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Schedule must be at most 5000 characters"))]
    pub schedule: String,

    #[validate(
        length(min = 1, max = 200, message = "Venue must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub venue: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Rules must be at most 5000 characters"))]
    pub rules: String,

    #[validate(
        length(min = 1, max = 200, message = "Contact must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub contact: String,

    #[validate(range(min = 1, message = "Maximum registrations must be at least 1"))]
    pub max_registrations: Option<i32>,
}

/// Request body for a status change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: RegistrationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use RegistrationStatus::*;

    fn details() -> EventDetails {
        EventDetails {
            title: "Hackathon".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            description: String::new(),
            schedule: "09:00 Kickoff".to_string(),
            venue: "Main Hall".to_string(),
            rules: String::new(),
            contact: "events@college.edu".to_string(),
            max_registrations: Some(2),
        }
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(Open.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Open));
        assert!(Open.can_transition_to(Closed));
        assert!(Paused.can_transition_to(Closed));
    }

    #[test]
    fn test_closed_is_terminal() {
        for next in [Open, Paused, Closed] {
            assert!(!Closed.can_transition_to(next));
            assert!(matches!(
                Closed.transition_to(next),
                Err(DomainError::InvalidTransition { from: Closed, .. })
            ));
        }
        assert!(Closed.is_terminal());
    }

    #[test]
    fn test_same_state_is_not_a_transition() {
        assert!(!Open.can_transition_to(Open));
        assert!(!Paused.can_transition_to(Paused));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Paused).unwrap(), "\"PAUSED\"");
        let status: RegistrationStatus = serde_json::from_str("\"CLOSED\"").unwrap();
        assert_eq!(status, Closed);
        assert_eq!(RegistrationStatus::from_str("open").unwrap(), Open);
        assert!(RegistrationStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_only_open_accepts_registrations() {
        assert!(Open.accepts_registrations());
        assert!(!Paused.accepts_registrations());
        assert!(!Closed.accepts_registrations());
    }

    #[test]
    fn test_details_validation() {
        assert!(details().validate().is_ok());

        let mut blank_title = details();
        blank_title.title = "   ".to_string();
        assert!(blank_title.validate().is_err());

        let mut zero_capacity = details();
        zero_capacity.max_registrations = Some(0);
        assert!(zero_capacity.validate().is_err());

        let mut unlimited = details();
        unlimited.max_registrations = None;
        assert!(unlimited.validate().is_ok());
    }

    #[test]
    fn test_details_deserialize_from_camel_case() {
        let json = serde_json::json!({
            "title": "Quiz Night",
            "date": "2025-04-01",
            "venue": "Library",
            "contact": "quiz@college.edu",
            "maxRegistrations": 40
        });
        let parsed: EventDetails = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.max_registrations, Some(40));
        assert!(parsed.rules.is_empty());
    }
}
