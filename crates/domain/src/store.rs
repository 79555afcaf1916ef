//! Storage seams. The in-memory and Postgres backends in the persistence
//! crate implement these.
//!
//! Workflows that span events and registrations (`update_event`,
//! `register`, `delete_event`) must run as one atomic unit in every
//! implementation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{
    Account, Event, EventDetails, Identity, NewAccount, OrganizerProfile, RegistrantDetails,
    Registration, RegistrationEdit, RegistrationStatus, Session,
};

#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(
        &self,
        details: EventDetails,
        organizer: &Identity,
    ) -> Result<Event, DomainError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, DomainError>;

    /// All events in creation order.
    async fn list_events(&self) -> Result<Vec<Event>, DomainError>;

    /// Replaces the editable fields, rejecting a limit below the live count.
    async fn update_event(&self, id: Uuid, details: EventDetails) -> Result<Event, DomainError>;

    async fn set_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Event, DomainError>;

    /// Removes the event and all of its registrations. Returns how many registrations went with it.
    async fn delete_event(&self, id: Uuid) -> Result<usize, DomainError>;

    async fn register(
        &self,
        event_id: Uuid,
        registrant: RegistrantDetails,
        authenticated_email: &str,
    ) -> Result<Registration, DomainError>;

    async fn find_registration(&self, id: Uuid) -> Result<Option<Registration>, DomainError>;

    async fn edit_registration(
        &self,
        id: Uuid,
        edit: RegistrationEdit,
        requester_email: &str,
    ) -> Result<Registration, DomainError>;

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Registration>, DomainError>;

    async fn list_by_user(&self, user_email: &str) -> Result<Vec<Registration>, DomainError>;

    async fn count_by_event(&self, event_id: Uuid) -> Result<i64, DomainError>;

    /// Count per event id; events without registrations may be absent.
    async fn registration_counts(&self) -> Result<HashMap<Uuid, i64>, DomainError>;
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Profiles ordered by club name.
    async fn list(&self) -> Result<Vec<OrganizerProfile>, DomainError>;

    async fn find(&self, id: Uuid) -> Result<Option<OrganizerProfile>, DomainError>;

    async fn find_by_club_name(
        &self,
        club_name: &str,
    ) -> Result<Option<OrganizerProfile>, DomainError>;

    /// Fails with `Conflict` when the club name is taken.
    async fn insert(&self, profile: OrganizerProfile) -> Result<OrganizerProfile, DomainError>;

    async fn update_club_name(
        &self,
        id: Uuid,
        club_name: &str,
    ) -> Result<OrganizerProfile, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the email is registered.
    async fn create_account(&self, account: NewAccount) -> Result<Account, DomainError>;

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DomainError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    async fn update_account_club_name(
        &self,
        id: Uuid,
        club_name: Option<&str>,
    ) -> Result<Account, DomainError>;

    /// Removes the account and its sessions.
    async fn delete_account(&self, id: Uuid) -> Result<(), DomainError>;

    async fn create_session(&self, session: Session) -> Result<Session, DomainError>;

    async fn find_session_by_access_hash(
        &self,
        access_token_hash: &str,
    ) -> Result<Option<Session>, DomainError>;

    async fn find_session_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<Session>, DomainError>;

    /// Swaps both token hashes in place.
    async fn rotate_session(
        &self,
        id: Uuid,
        access_token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, DomainError>;

    async fn delete_session(&self, id: Uuid) -> Result<(), DomainError>;

    /// Removes sessions past their expiry. Returns the number deleted.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
