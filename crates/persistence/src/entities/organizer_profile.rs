//! Organizer profile entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the organizer_profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizerProfileEntity {
    pub id: Uuid,
    pub club_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<OrganizerProfileEntity> for domain::models::OrganizerProfile {
    fn from(entity: OrganizerProfileEntity) -> Self {
        Self {
            id: entity.id,
            club_name: entity.club_name,
            email: entity.email,
            created_at: entity.created_at,
        }
    }
}
