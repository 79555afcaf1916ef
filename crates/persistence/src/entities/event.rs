//! Event entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Event, RegistrationStatus};
use domain::DomainError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
    pub schedule: String,
    pub venue: String,
    pub rules: String,
    pub contact: String,
    pub club_name: String,
    pub organizer_id: Uuid,
    pub max_registrations: Option<i32>,
    pub registration_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventEntity> for Event {
    type Error = DomainError;

    fn try_from(entity: EventEntity) -> Result<Self, Self::Error> {
        let registration_status = entity
            .registration_status
            .parse::<RegistrationStatus>()
            .map_err(|e| DomainError::Storage(format!("event {}: {}", entity.id, e)))?;
        Ok(Self {
            id: entity.id,
            title: entity.title,
            date: entity.date,
            description: entity.description,
            schedule: entity.schedule,
            venue: entity.venue,
            rules: entity.rules,
            contact: entity.contact,
            club_name: entity.club_name,
            organizer_id: entity.organizer_id,
            max_registrations: entity.max_registrations,
            registration_status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
