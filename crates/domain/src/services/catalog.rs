//! Event Catalog: event records and their status state machine.

use chrono::Utc;
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{Event, EventDetails, Identity, RegistrationStatus};

/// Builds a new OPEN event owned by `organizer`.
///
/// Fails with `IdentityError` when the organizer has no club.
pub fn new_event(details: EventDetails, organizer: &Identity) -> Result<Event, DomainError> {
    let club_name = organizer.require_club()?.to_string();
    let now = Utc::now();

    let mut event = Event {
        id: Uuid::new_v4(),
        title: String::new(),
        date: details.date,
        description: String::new(),
        schedule: String::new(),
        venue: String::new(),
        rules: String::new(),
        contact: String::new(),
        club_name,
        organizer_id: organizer.user_id,
        max_registrations: None,
        registration_status: RegistrationStatus::Open,
        created_at: now,
        updated_at: now,
    };
    event.apply_details(details);
    Ok(event)
}

/// A limit may never drop below the registrations already taken.
pub fn check_capacity_change(
    new_limit: Option<i32>,
    current_count: i64,
) -> Result<(), DomainError> {
    match new_limit {
        Some(limit) if i64::from(limit) < current_count => Err(DomainError::CapacityViolation {
            limit,
            current: current_count,
        }),
        _ => Ok(()),
    }
}

/// In-memory event collection, in creation order.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: Vec<Event>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_event(
        &mut self,
        details: EventDetails,
        organizer: &Identity,
    ) -> Result<Event, DomainError> {
        let event = new_event(details, organizer)?;
        self.events.push(event.clone());
        Ok(event)
    }

    /// Replaces the editable fields. `current_count` is the ledger's count
    /// for this event at the time of the call.
    pub fn update_event(
        &mut self,
        id: Uuid,
        details: EventDetails,
        current_count: i64,
    ) -> Result<Event, DomainError> {
        check_capacity_change(details.max_registrations, current_count)?;
        let event = self.get_mut(id)?;
        event.apply_details(details);
        Ok(event.clone())
    }

    pub fn set_status(
        &mut self,
        id: Uuid,
        next: RegistrationStatus,
    ) -> Result<Event, DomainError> {
        let event = self.get_mut(id)?;
        event.registration_status = event.registration_status.transition_to(next)?;
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    /// Removes the record only; registrations are the caller's concern.
    pub fn delete_event(&mut self, id: Uuid) -> Result<Event, DomainError> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DomainError::not_found("Event"))?;
        Ok(self.events.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn list(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Event, DomainError> {
        self.events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DomainError::not_found("Event"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{event_details, organizer};
    use RegistrationStatus::*;

    #[test]
    fn test_create_event_starts_open_with_organizer_club() {
        let mut catalog = EventCatalog::new();
        let lead = organizer("Robotics");

        let event = catalog.create_event(event_details(Some(2)), &lead).unwrap();

        assert_eq!(event.registration_status, Open);
        assert_eq!(event.organizer_id, lead.user_id);
        assert_eq!(event.club_name, "Robotics");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_create_event_without_club_is_identity_error() {
        let mut catalog = EventCatalog::new();
        let mut lead = organizer("Robotics");
        lead.club_name = None;

        let result = catalog.create_event(event_details(None), &lead);

        assert!(matches!(result, Err(DomainError::Identity(_))));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_update_rejects_limit_below_count() {
        let mut catalog = EventCatalog::new();
        let event = catalog
            .create_event(event_details(Some(5)), &organizer("Robotics"))
            .unwrap();

        let result = catalog.update_event(event.id, event_details(Some(2)), 3);

        assert_eq!(
            result,
            Err(DomainError::CapacityViolation {
                limit: 2,
                current: 3
            })
        );
        assert_eq!(catalog.get(event.id).unwrap().max_registrations, Some(5));
    }

    #[test]
    fn test_update_allows_limit_equal_to_count_and_unlimited() {
        let mut catalog = EventCatalog::new();
        let event = catalog
            .create_event(event_details(Some(5)), &organizer("Robotics"))
            .unwrap();

        let mut details = event_details(Some(3));
        details.title = "Renamed".to_string();
        let updated = catalog.update_event(event.id, details, 3).unwrap();
        assert_eq!(updated.max_registrations, Some(3));
        assert_eq!(updated.title, "Renamed");

        let unlimited = catalog.update_event(event.id, event_details(None), 50).unwrap();
        assert_eq!(unlimited.max_registrations, None);
    }

    #[test]
    fn test_status_walk_and_closed_is_terminal() {
        let mut catalog = EventCatalog::new();
        let id = catalog
            .create_event(event_details(None), &organizer("Robotics"))
            .unwrap()
            .id;

        assert_eq!(catalog.set_status(id, Paused).unwrap().registration_status, Paused);
        assert_eq!(catalog.set_status(id, Open).unwrap().registration_status, Open);
        assert_eq!(catalog.set_status(id, Closed).unwrap().registration_status, Closed);

        for next in [Open, Paused, Closed] {
            assert!(matches!(
                catalog.set_status(id, next),
                Err(DomainError::InvalidTransition { .. })
            ));
        }
        assert_eq!(catalog.get(id).unwrap().registration_status, Closed);
    }

    #[test]
    fn test_delete_and_missing_event() {
        let mut catalog = EventCatalog::new();
        let id = catalog
            .create_event(event_details(None), &organizer("Robotics"))
            .unwrap()
            .id;

        assert_eq!(catalog.delete_event(id).unwrap().id, id);
        assert!(catalog.get(id).is_none());
        assert!(matches!(
            catalog.delete_event(id),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            catalog.set_status(id, Paused),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn test_check_capacity_change() {
        assert!(check_capacity_change(None, 100).is_ok());
        assert!(check_capacity_change(Some(3), 3).is_ok());
        assert!(check_capacity_change(Some(3), 4).is_err());
    }
}
