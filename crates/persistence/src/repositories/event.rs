//! Event and registration repository for database operations.
//!
//! Workflows that read a count and then write run in one transaction that
//! holds the event row with `FOR UPDATE`, so concurrent registrations for
//! the same event serialize on that row.

use std::collections::HashMap;

use chrono::Utc;
use domain::models::{
    Event, EventDetails, Identity, RegistrantDetails, Registration, RegistrationEdit,
    RegistrationStatus,
};
use domain::services::catalog::{check_capacity_change, new_event};
use domain::services::ledger::ensure_can_register;
use domain::store::EventStore;
use domain::DomainError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{EventEntity, RegistrationEntity};
use crate::error::storage_error;
use crate::metrics::QueryTimer;

const EVENT_COLUMNS: &str = "id, title, date, description, schedule, venue, rules, contact, \
     club_name, organizer_id, max_registrations, registration_status, created_at, updated_at";

const REGISTRATION_COLUMNS: &str = "id, event_id, name, email, college, reference_id, \
     payment_evidence, details_edited, user_email, created_at";

/// Postgres-backed [`EventStore`].
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool.begin().await.map_err(storage_error)
    }

    async fn lock_event(
        tx: &mut Transaction<'static, Postgres>,
        id: Uuid,
    ) -> Result<Event, DomainError> {
        let entity = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {} FROM events WHERE id = $1 FOR UPDATE",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| DomainError::not_found("Event"))?;
        Event::try_from(entity)
    }

    async fn count_in(
        tx: &mut Transaction<'static, Postgres>,
        event_id: Uuid,
    ) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(storage_error)
    }

    async fn write_event(
        tx: &mut Transaction<'static, Postgres>,
        event: &Event,
    ) -> Result<Event, DomainError> {
        let entity = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            UPDATE events
            SET title = $2, date = $3, description = $4, schedule = $5, venue = $6,
                rules = $7, contact = $8, max_registrations = $9,
                registration_status = $10, updated_at = $11
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event.id)
        .bind(&event.title)
        .bind(event.date)
        .bind(&event.description)
        .bind(&event.schedule)
        .bind(&event.venue)
        .bind(&event.rules)
        .bind(&event.contact)
        .bind(event.max_registrations)
        .bind(event.registration_status.as_str())
        .bind(event.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(storage_error)?;
        Event::try_from(entity)
    }

    fn to_events(entities: Vec<EventEntity>) -> Result<Vec<Event>, DomainError> {
        entities.into_iter().map(Event::try_from).collect()
    }
}

#[async_trait::async_trait]
impl EventStore for EventRepository {
    async fn create_event(
        &self,
        details: EventDetails,
        organizer: &Identity,
    ) -> Result<Event, DomainError> {
        let event = new_event(details, organizer)?;
        let timer = QueryTimer::new("create_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            INSERT INTO events (id, title, date, description, schedule, venue, rules, contact,
                                club_name, organizer_id, max_registrations, registration_status,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event.id)
        .bind(&event.title)
        .bind(event.date)
        .bind(&event.description)
        .bind(&event.schedule)
        .bind(&event.venue)
        .bind(&event.rules)
        .bind(&event.contact)
        .bind(&event.club_name)
        .bind(event.organizer_id)
        .bind(event.max_registrations)
        .bind(event.registration_status.as_str())
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Event::try_from(result.map_err(storage_error)?)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, DomainError> {
        let timer = QueryTimer::new("find_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result.map_err(storage_error)?.map(Event::try_from).transpose()
    }

    async fn list_events(&self) -> Result<Vec<Event>, DomainError> {
        let timer = QueryTimer::new("list_events");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {} FROM events ORDER BY created_at, id",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Self::to_events(result.map_err(storage_error)?)
    }

    async fn update_event(&self, id: Uuid, details: EventDetails) -> Result<Event, DomainError> {
        QueryTimer::new("update_event")
            .time(async {
                let mut tx = self.begin().await?;

                let mut event = Self::lock_event(&mut tx, id).await?;
                let current = Self::count_in(&mut tx, id).await?;
                check_capacity_change(details.max_registrations, current)?;
                event.apply_details(details);

                let updated = Self::write_event(&mut tx, &event).await?;
                tx.commit().await.map_err(storage_error)?;
                Ok::<_, DomainError>(updated)
            })
            .await
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Event, DomainError> {
        QueryTimer::new("set_event_status")
            .time(async {
                let mut tx = self.begin().await?;

                let mut event = Self::lock_event(&mut tx, id).await?;
                event.registration_status = event.registration_status.transition_to(status)?;
                event.updated_at = Utc::now();

                let updated = Self::write_event(&mut tx, &event).await?;
                tx.commit().await.map_err(storage_error)?;
                Ok::<_, DomainError>(updated)
            })
            .await
    }

    async fn delete_event(&self, id: Uuid) -> Result<usize, DomainError> {
        QueryTimer::new("delete_event")
            .time(async {
                let mut tx = self.begin().await?;

                Self::lock_event(&mut tx, id).await?;
                let removed = sqlx::query("DELETE FROM registrations WHERE event_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(storage_error)?
                    .rows_affected();
                sqlx::query("DELETE FROM events WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(storage_error)?;

                tx.commit().await.map_err(storage_error)?;
                Ok::<_, DomainError>(removed as usize)
            })
            .await
    }

    async fn register(
        &self,
        event_id: Uuid,
        registrant: RegistrantDetails,
        authenticated_email: &str,
    ) -> Result<Registration, DomainError> {
        QueryTimer::new("create_registration")
            .time(async {
                let mut tx = self.begin().await?;

                let event = Self::lock_event(&mut tx, event_id).await?;
                let current = Self::count_in(&mut tx, event_id).await?;
                ensure_can_register(&event, current)?;

                let registration = Registration::new(event_id, registrant, authenticated_email);
                let entity = sqlx::query_as::<_, RegistrationEntity>(&format!(
                    r#"
                    INSERT INTO registrations (id, event_id, name, email, college, reference_id,
                                               payment_evidence, details_edited, user_email, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    RETURNING {}
                    "#,
                    REGISTRATION_COLUMNS
                ))
                .bind(registration.id)
                .bind(registration.event_id)
                .bind(&registration.name)
                .bind(&registration.email)
                .bind(&registration.college)
                .bind(&registration.reference_id)
                .bind(&registration.payment_evidence)
                .bind(registration.details_edited)
                .bind(&registration.user_email)
                .bind(registration.created_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(storage_error)?;

                tx.commit().await.map_err(storage_error)?;
                Ok::<Registration, DomainError>(entity.into())
            })
            .await
    }

    async fn find_registration(&self, id: Uuid) -> Result<Option<Registration>, DomainError> {
        let timer = QueryTimer::new("find_registration");
        let result = sqlx::query_as::<_, RegistrationEntity>(&format!(
            "SELECT {} FROM registrations WHERE id = $1",
            REGISTRATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(storage_error)?.map(Into::into))
    }

    async fn edit_registration(
        &self,
        id: Uuid,
        edit: RegistrationEdit,
        requester_email: &str,
    ) -> Result<Registration, DomainError> {
        QueryTimer::new("edit_registration")
            .time(async {
                let mut tx = self.begin().await?;

                let mut registration: Registration =
                    sqlx::query_as::<_, RegistrationEntity>(&format!(
                        "SELECT {} FROM registrations WHERE id = $1 FOR UPDATE",
                        REGISTRATION_COLUMNS
                    ))
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(storage_error)?
                    .ok_or_else(|| DomainError::not_found("Registration"))?
                    .into();

                registration.apply_edit(edit, requester_email)?;

                let entity = sqlx::query_as::<_, RegistrationEntity>(&format!(
                    r#"
                    UPDATE registrations
                    SET name = $2, college = $3, details_edited = $4
                    WHERE id = $1
                    RETURNING {}
                    "#,
                    REGISTRATION_COLUMNS
                ))
                .bind(id)
                .bind(&registration.name)
                .bind(&registration.college)
                .bind(registration.details_edited)
                .fetch_one(&mut *tx)
                .await
                .map_err(storage_error)?;

                tx.commit().await.map_err(storage_error)?;
                Ok::<Registration, DomainError>(entity.into())
            })
            .await
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Registration>, DomainError> {
        let timer = QueryTimer::new("list_registrations_by_event");
        let result = sqlx::query_as::<_, RegistrationEntity>(&format!(
            "SELECT {} FROM registrations WHERE event_id = $1 ORDER BY created_at, id",
            REGISTRATION_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(storage_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list_by_user(&self, user_email: &str) -> Result<Vec<Registration>, DomainError> {
        let timer = QueryTimer::new("list_registrations_by_user");
        let result = sqlx::query_as::<_, RegistrationEntity>(&format!(
            "SELECT {} FROM registrations WHERE user_email = $1 ORDER BY created_at, id",
            REGISTRATION_COLUMNS
        ))
        .bind(shared::validation::normalize_email(user_email))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(storage_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn count_by_event(&self, event_id: Uuid) -> Result<i64, DomainError> {
        let timer = QueryTimer::new("count_registrations_by_event");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result.map_err(storage_error)
    }

    async fn registration_counts(&self) -> Result<HashMap<Uuid, i64>, DomainError> {
        let timer = QueryTimer::new("registration_counts");
        let result = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT event_id, COUNT(*) FROM registrations GROUP BY event_id",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(storage_error)?.into_iter().collect())
    }
}
