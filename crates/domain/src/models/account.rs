//! Accounts and sessions behind the auth service.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::identity::{Identity, Role};

/// A stored login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    /// Lowercased, unique.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub club_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            email: self.email.clone(),
            role: self.role,
            club_name: self.club_name.clone(),
        }
    }
}

/// Data needed to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub club_name: Option<String>,
}

/// A signed-in session. Token ids are stored as SHA-256 hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
