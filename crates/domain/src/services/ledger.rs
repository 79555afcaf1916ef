//! Registration Ledger: registrations keyed to events and accounts.

use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{Event, RegistrantDetails, Registration, RegistrationEdit};

/// Status first, then capacity against the count taken right now.
pub fn ensure_can_register(event: &Event, current_count: i64) -> Result<(), DomainError> {
    if !event.registration_status.accepts_registrations() {
        return Err(DomainError::NotEligible {
            status: event.registration_status,
        });
    }
    if let Some(limit) = event.max_registrations {
        if current_count >= i64::from(limit) {
            return Err(DomainError::CapacityExceeded { limit });
        }
    }
    Ok(())
}

/// In-memory registration collection, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RegistrationLedger {
    registrations: Vec<Registration>,
}

impl RegistrationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a registration if `event` is OPEN and not full.
    ///
    /// Callers sharing a ledger must hold it exclusively across this call;
    /// the count and the append are one step.
    pub fn register(
        &mut self,
        event: &Event,
        registrant: RegistrantDetails,
        authenticated_email: &str,
    ) -> Result<Registration, DomainError> {
        ensure_can_register(event, self.count_by_event(event.id))?;
        let registration = Registration::new(event.id, registrant, authenticated_email);
        self.registrations.push(registration.clone());
        Ok(registration)
    }

    pub fn edit_once(
        &mut self,
        id: Uuid,
        edit: RegistrationEdit,
        requester_email: &str,
    ) -> Result<Registration, DomainError> {
        let registration = self
            .registrations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DomainError::not_found("Registration"))?;
        registration.apply_edit(edit, requester_email)?;
        Ok(registration.clone())
    }

    pub fn get(&self, id: Uuid) -> Option<&Registration> {
        self.registrations.iter().find(|r| r.id == id)
    }

    pub fn list_by_event(&self, event_id: Uuid) -> Vec<Registration> {
        self.registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect()
    }

    pub fn list_by_user(&self, user_email: &str) -> Vec<Registration> {
        self.registrations
            .iter()
            .filter(|r| r.is_owned_by(user_email))
            .cloned()
            .collect()
    }

    pub fn count_by_event(&self, event_id: Uuid) -> i64 {
        self.registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64
    }

    /// Cascade half of an event deletion. Returns how many were removed.
    pub fn remove_by_event(&mut self, event_id: Uuid) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.event_id != event_id);
        before - self.registrations.len()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
