//! In-process storage backend.
//!
//! Events and registrations live in one [`EventRegistry`] behind a single
//! async mutex, so every workflow runs under that lock end to end.
//! Contents are lost on restart.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domain::error::CLUB_NAME_TAKEN;
use domain::models::{
    Account, Event, EventDetails, Identity, NewAccount, OrganizerProfile, RegistrantDetails,
    Registration, RegistrationEdit, RegistrationStatus, Session,
};
use domain::services::EventRegistry;
use domain::store::{AccountStore, EventStore, ProfileStore};
use domain::DomainError;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::EMAIL_TAKEN;

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    registry: Mutex<EventRegistry>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryEventStore {
    async fn create_event(
        &self,
        details: EventDetails,
        organizer: &Identity,
    ) -> Result<Event, DomainError> {
        self.registry.lock().await.create_event(details, organizer)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, DomainError> {
        Ok(self.registry.lock().await.get_event(id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, DomainError> {
        Ok(self.registry.lock().await.list_events())
    }

    async fn update_event(&self, id: Uuid, details: EventDetails) -> Result<Event, DomainError> {
        self.registry.lock().await.update_event_checked(id, details)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Event, DomainError> {
        self.registry.lock().await.set_status(id, status)
    }

    async fn delete_event(&self, id: Uuid) -> Result<usize, DomainError> {
        self.registry.lock().await.delete_event_cascade(id)
    }

    async fn register(
        &self,
        event_id: Uuid,
        registrant: RegistrantDetails,
        authenticated_email: &str,
    ) -> Result<Registration, DomainError> {
        self.registry
            .lock()
            .await
            .register(event_id, registrant, authenticated_email)
    }

    async fn find_registration(&self, id: Uuid) -> Result<Option<Registration>, DomainError> {
        Ok(self.registry.lock().await.get_registration(id).cloned())
    }

    async fn edit_registration(
        &self,
        id: Uuid,
        edit: RegistrationEdit,
        requester_email: &str,
    ) -> Result<Registration, DomainError> {
        self.registry
            .lock()
            .await
            .edit_registration(id, edit, requester_email)
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Registration>, DomainError> {
        Ok(self.registry.lock().await.ledger().list_by_event(event_id))
    }

    async fn list_by_user(&self, user_email: &str) -> Result<Vec<Registration>, DomainError> {
        Ok(self.registry.lock().await.ledger().list_by_user(user_email))
    }

    async fn count_by_event(&self, event_id: Uuid) -> Result<i64, DomainError> {
        Ok(self.registry.lock().await.count_by_event(event_id))
    }

    async fn registration_counts(&self) -> Result<HashMap<Uuid, i64>, DomainError> {
        Ok(self.registry.lock().await.registration_counts())
    }
}

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<Vec<OrganizerProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn list(&self) -> Result<Vec<OrganizerProfile>, DomainError> {
        let mut profiles = self.profiles.read().await.clone();
        profiles.sort_by(|a, b| a.club_name.cmp(&b.club_name));
        Ok(profiles)
    }

    async fn find(&self, id: Uuid) -> Result<Option<OrganizerProfile>, DomainError> {
        Ok(self.profiles.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_club_name(
        &self,
        club_name: &str,
    ) -> Result<Option<OrganizerProfile>, DomainError> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.club_name == club_name)
            .cloned())
    }

    async fn insert(&self, profile: OrganizerProfile) -> Result<OrganizerProfile, DomainError> {
        let mut profiles = self.profiles.write().await;
        if profiles.iter().any(|p| p.club_name == profile.club_name) {
            return Err(DomainError::Conflict(CLUB_NAME_TAKEN.to_string()));
        }
        if profiles.iter().any(|p| p.id == profile.id) {
            return Err(DomainError::Conflict("Resource already exists".to_string()));
        }
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_club_name(
        &self,
        id: Uuid,
        club_name: &str,
    ) -> Result<OrganizerProfile, DomainError> {
        let mut profiles = self.profiles.write().await;
        if profiles.iter().any(|p| p.club_name == club_name && p.id != id) {
            return Err(DomainError::Conflict(CLUB_NAME_TAKEN.to_string()));
        }
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found("Organizer"))?;
        profile.club_name = club_name.to_string();
        Ok(profile.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        if profiles.len() == before {
            return Err(DomainError::not_found("Organizer"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct AccountTables {
    accounts: HashMap<Uuid, Account>,
    sessions: HashMap<Uuid, Session>,
}

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    tables: RwLock<AccountTables>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, DomainError> {
        let email = shared::validation::normalize_email(&account.email);
        let mut tables = self.tables.write().await;
        if tables.accounts.values().any(|a| a.email == email) {
            return Err(DomainError::Conflict(EMAIL_TAKEN.to_string()));
        }
        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            email,
            password_hash: account.password_hash,
            role: account.role,
            club_name: account.club_name,
            created_at: now,
            updated_at: now,
        };
        tables.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let email = shared::validation::normalize_email(email);
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn update_account_club_name(
        &self,
        id: Uuid,
        club_name: Option<&str>,
    ) -> Result<Account, DomainError> {
        let mut tables = self.tables.write().await;
        let account = tables
            .accounts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Account"))?;
        account.club_name = club_name.map(str::to_string);
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.remove(&id).is_none() {
            return Err(DomainError::not_found("Account"));
        }
        tables.sessions.retain(|_, s| s.account_id != id);
        Ok(())
    }

    async fn create_session(&self, session: Session) -> Result<Session, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.contains_key(&session.account_id) {
            return Err(DomainError::not_found("Referenced resource"));
        }
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session_by_access_hash(
        &self,
        access_token_hash: &str,
    ) -> Result<Option<Session>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .sessions
            .values()
            .find(|s| s.access_token_hash == access_token_hash)
            .cloned())
    }

    async fn find_session_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<Session>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .sessions
            .values()
            .find(|s| s.refresh_token_hash == refresh_token_hash)
            .cloned())
    }

    async fn rotate_session(
        &self,
        id: Uuid,
        access_token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, DomainError> {
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Session"))?;
        session.access_token_hash = access_token_hash.to_string();
        session.refresh_token_hash = refresh_token_hash.to_string();
        session.expires_at = expires_at;
        Ok(session.clone())
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), DomainError> {
        self.tables.write().await.sessions.remove(&id);
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}
