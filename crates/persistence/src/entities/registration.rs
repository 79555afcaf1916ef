//! Registration entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub college: String,
    pub reference_id: String,
    pub payment_evidence: String,
    pub details_edited: bool,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl From<RegistrationEntity> for domain::models::Registration {
    fn from(entity: RegistrationEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            name: entity.name,
            email: entity.email,
            college: entity.college,
            reference_id: entity.reference_id,
            payment_evidence: entity.payment_evidence,
            details_edited: entity.details_edited,
            user_email: entity.user_email,
            created_at: entity.created_at,
        }
    }
}
