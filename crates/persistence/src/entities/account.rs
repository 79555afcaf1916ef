//! Account and session entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Account, Role, Session};
use domain::DomainError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the accounts table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub club_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AccountEntity> for Account {
    type Error = DomainError;

    fn try_from(entity: AccountEntity) -> Result<Self, Self::Error> {
        let role = entity
            .role
            .parse::<Role>()
            .map_err(|e| DomainError::Storage(format!("account {}: {}", entity.id, e)))?;
        Ok(Self {
            id: entity.id,
            email: entity.email,
            password_hash: entity.password_hash,
            role,
            club_name: entity.club_name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

/// Database row mapping for the sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionEntity {
    pub id: Uuid,
    pub account_id: Uuid,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<SessionEntity> for Session {
    fn from(entity: SessionEntity) -> Self {
        Self {
            id: entity.id,
            account_id: entity.account_id,
            access_token_hash: entity.access_token_hash,
            refresh_token_hash: entity.refresh_token_hash,
            expires_at: entity.expires_at,
            created_at: entity.created_at,
        }
    }
}
