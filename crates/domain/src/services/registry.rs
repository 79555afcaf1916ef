//! Catalog and ledger composed into the workflows that span both.
//!
//! Every method takes `&mut self`, so a registry shared behind one lock
//! runs each workflow (count, check, mutate) as a single unit.

use std::collections::HashMap;
use uuid::Uuid;

use super::catalog::EventCatalog;
use super::ledger::RegistrationLedger;
use crate::error::DomainError;
use crate::models::{
    Event, EventDetails, Identity, RegistrantDetails, Registration, RegistrationEdit,
    RegistrationStatus,
};

#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    catalog: EventCatalog,
    ledger: RegistrationLedger,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &RegistrationLedger {
        &self.ledger
    }

    pub fn create_event(
        &mut self,
        details: EventDetails,
        organizer: &Identity,
    ) -> Result<Event, DomainError> {
        self.catalog.create_event(details, organizer)
    }

    /// Edits an event, refusing a limit below the current registration count.
    pub fn update_event_checked(
        &mut self,
        id: Uuid,
        details: EventDetails,
    ) -> Result<Event, DomainError> {
        let current = self.ledger.count_by_event(id);
        self.catalog.update_event(id, details, current)
    }

    pub fn set_status(
        &mut self,
        id: Uuid,
        next: RegistrationStatus,
    ) -> Result<Event, DomainError> {
        self.catalog.set_status(id, next)
    }

    /// Deletes the event and every registration for it.
    ///
    /// Returns the number of registrations removed.
    pub fn delete_event_cascade(&mut self, id: Uuid) -> Result<usize, DomainError> {
        self.catalog.delete_event(id)?;
        Ok(self.ledger.remove_by_event(id))
    }

    pub fn register(
        &mut self,
        event_id: Uuid,
        registrant: RegistrantDetails,
        authenticated_email: &str,
    ) -> Result<Registration, DomainError> {
        let event = self
            .catalog
            .get(event_id)
            .ok_or_else(|| DomainError::not_found("Event"))?;
        self.ledger.register(event, registrant, authenticated_email)
    }

    pub fn edit_registration(
        &mut self,
        id: Uuid,
        edit: RegistrationEdit,
        requester_email: &str,
    ) -> Result<Registration, DomainError> {
        self.ledger.edit_once(id, edit, requester_email)
    }

    pub fn get_event(&self, id: Uuid) -> Option<&Event> {
        self.catalog.get(id)
    }

    pub fn get_registration(&self, id: Uuid) -> Option<&Registration> {
        self.ledger.get(id)
    }

    pub fn list_events(&self) -> Vec<Event> {
        self.catalog.list().to_vec()
    }

    pub fn count_by_event(&self, event_id: Uuid) -> i64 {
        self.ledger.count_by_event(event_id)
    }

    /// Current count for every event in the catalog.
    pub fn registration_counts(&self) -> HashMap<Uuid, i64> {
        self.catalog
            .list()
            .iter()
            .map(|e| (e.id, self.ledger.count_by_event(e.id)))
            .collect()
    }
}
