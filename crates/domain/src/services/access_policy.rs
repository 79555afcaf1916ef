//! Access Policy: who may do what, decided from the acting identity's role.
//!
//! All permission decisions go through [`allows`], a single table over
//! (role, action, ownership). The affordance helpers explain *why* an action
//! is unavailable so callers can render a disabled control.

use serde::Serialize;

use crate::error::DomainError;
use crate::models::{Event, Identity, Registration, RegistrationStatus, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewEvents,
    CreateEvent,
    EditEvent,
    DeleteEvent,
    ChangeEventStatus,
    ViewRegistrations,
    ExportRegistrations,
    Register,
    EditRegistration,
    ViewOwnRegistrations,
    ViewDashboard,
    ManageOrganizers,
    GenerateDescription,
    AskAssistant,
}

/// Relationship between the acting identity and the target record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owner,
    NotOwner,
    NotApplicable,
}

impl Ownership {
    pub fn of_event(identity: &Identity, event: &Event) -> Self {
        if event.is_managed_by(identity.user_id) {
            Ownership::Owner
        } else {
            Ownership::NotOwner
        }
    }

    pub fn of_registration(identity: &Identity, registration: &Registration) -> Self {
        if registration.is_owned_by(&identity.email) {
            Ownership::Owner
        } else {
            Ownership::NotOwner
        }
    }
}

/// The permission table.
pub fn allows(role: Role, action: Action, ownership: Ownership) -> bool {
    use Action::*;
    let owner = ownership == Ownership::Owner;

    match role {
        Role::Participant => match action {
            ViewEvents | Register | ViewOwnRegistrations | AskAssistant => true,
            EditRegistration => owner,
            _ => false,
        },
        Role::Organizer => match action {
            ViewEvents | CreateEvent | ViewDashboard | GenerateDescription | AskAssistant => true,
            EditEvent | DeleteEvent | ChangeEventStatus | ViewRegistrations
            | ExportRegistrations => owner,
            _ => false,
        },
        Role::Admin => matches!(
            action,
            ViewEvents
                | ViewRegistrations
                | ExportRegistrations
                | ViewDashboard
                | ManageOrganizers
                | AskAssistant
        ),
    }
}

/// `Forbidden` unless the table allows the action.
pub fn authorize(
    identity: &Identity,
    action: Action,
    ownership: Ownership,
) -> Result<(), DomainError> {
    if allows(identity.role, action, ownership) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %identity.user_id,
            role = %identity.role,
            action = ?action,
            ownership = ?ownership,
            "Access denied"
        );
        Err(DomainError::Forbidden(denial_message(identity.role, action)))
    }
}

fn denial_message(role: Role, action: Action) -> String {
    match (role, action) {
        (Role::Admin, Action::CreateEvent) => "Administrators cannot create events".to_string(),
        (_, Action::ManageOrganizers) => "Only administrators can manage organizers".to_string(),
        (_, Action::Register) => "Only participants can register for events".to_string(),
        (_, Action::ViewDashboard) => "Access Denied".to_string(),
        (_, Action::EditEvent | Action::DeleteEvent | Action::ChangeEventStatus) => {
            "You can only manage events organized by your club account".to_string()
        }
        (_, Action::ViewRegistrations | Action::ExportRegistrations) => {
            "You can only view registrations for events you manage".to_string()
        }
        _ => format!("{} accounts cannot perform this action", role),
    }
}

/// Shared fullness predicate. `count` must be the current count.
pub fn is_full(event: &Event, count: i64) -> bool {
    event.is_full(count)
}

/// What the registration control for an event should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationAffordance {
    Available,
    NotParticipant,
    Closed,
    Paused,
    Full,
}

pub fn registration_affordance(
    identity: &Identity,
    event: &Event,
    count: i64,
) -> RegistrationAffordance {
    if !allows(identity.role, Action::Register, Ownership::of_event(identity, event)) {
        return RegistrationAffordance::NotParticipant;
    }
    match event.registration_status {
        RegistrationStatus::Closed => RegistrationAffordance::Closed,
        RegistrationStatus::Paused => RegistrationAffordance::Paused,
        RegistrationStatus::Open if is_full(event, count) => RegistrationAffordance::Full,
        RegistrationStatus::Open => RegistrationAffordance::Available,
    }
}

/// What the edit control for a registration should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditAffordance {
    Available,
    NotOwner,
    AlreadyEdited,
}

pub fn edit_affordance(identity: &Identity, registration: &Registration) -> EditAffordance {
    let ownership = Ownership::of_registration(identity, registration);
    if !allows(identity.role, Action::EditRegistration, ownership) {
        EditAffordance::NotOwner
    } else if registration.details_edited {
        EditAffordance::AlreadyEdited
    } else {
        EditAffordance::Available
    }
}
