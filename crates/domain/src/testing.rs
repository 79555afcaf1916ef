//! Fixtures shared by the unit tests of this crate.

use chrono::NaiveDate;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use crate::models::{EventDetails, Identity, RegistrantDetails, Role};

pub fn organizer(club: &str) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        email: format!("{}@college.edu", club.to_lowercase().replace(' ', ".")),
        role: Role::Organizer,
        club_name: Some(club.to_string()),
    }
}

pub fn participant(email: &str) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        email: email.to_string(),
        role: Role::Participant,
        club_name: None,
    }
}

pub fn admin() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        email: "admin@college.edu".to_string(),
        role: Role::Admin,
        club_name: None,
    }
}

pub fn event_details(max_registrations: Option<i32>) -> EventDetails {
    dated_details("Hackathon", 2025, 3, 14, max_registrations)
}

pub fn dated_details(
    title: &str,
    year: i32,
    month: u32,
    day: u32,
    max_registrations: Option<i32>,
) -> EventDetails {
    EventDetails {
        title: title.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        description: "Build something in 24 hours.".to_string(),
        schedule: "09:00 Kickoff".to_string(),
        venue: "Main Hall".to_string(),
        rules: "Teams of up to 4.".to_string(),
        contact: "events@college.edu".to_string(),
        max_registrations,
    }
}

pub fn registrant(name: &str) -> RegistrantDetails {
    RegistrantDetails {
        name: name.to_string(),
        email: format!("{}@mail.com", name.to_lowercase()),
        college: "City College".to_string(),
        reference_id: format!("REF-{}", name.to_uppercase()),
        payment_evidence: format!("{}.png", name.to_lowercase()),
    }
}

/// A registrant with generated name and email.
pub fn fake_registrant() -> RegistrantDetails {
    let name: String = Name().fake();
    RegistrantDetails {
        email: SafeEmail().fake(),
        ..registrant(&name)
    }
}
