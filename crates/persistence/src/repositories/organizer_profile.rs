//! Organizer profile repository for database operations.

use domain::models::OrganizerProfile;
use domain::store::ProfileStore;
use domain::DomainError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::OrganizerProfileEntity;
use crate::error::storage_error;
use crate::metrics::QueryTimer;

/// Postgres-backed [`ProfileStore`].
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileStore for ProfileRepository {
    async fn list(&self) -> Result<Vec<OrganizerProfile>, DomainError> {
        let timer = QueryTimer::new("list_organizer_profiles");
        let result = sqlx::query_as::<_, OrganizerProfileEntity>(
            r#"
            SELECT id, club_name, email, created_at
            FROM organizer_profiles
            ORDER BY club_name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(storage_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<OrganizerProfile>, DomainError> {
        let timer = QueryTimer::new("find_organizer_profile");
        let result = sqlx::query_as::<_, OrganizerProfileEntity>(
            r#"
            SELECT id, club_name, email, created_at
            FROM organizer_profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(storage_error)?.map(Into::into))
    }

    async fn find_by_club_name(
        &self,
        club_name: &str,
    ) -> Result<Option<OrganizerProfile>, DomainError> {
        let timer = QueryTimer::new("find_organizer_profile_by_club");
        let result = sqlx::query_as::<_, OrganizerProfileEntity>(
            r#"
            SELECT id, club_name, email, created_at
            FROM organizer_profiles
            WHERE club_name = $1
            "#,
        )
        .bind(club_name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(storage_error)?.map(Into::into))
    }

    async fn insert(&self, profile: OrganizerProfile) -> Result<OrganizerProfile, DomainError> {
        let timer = QueryTimer::new("insert_organizer_profile");
        let result = sqlx::query_as::<_, OrganizerProfileEntity>(
            r#"
            INSERT INTO organizer_profiles (id, club_name, email, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, club_name, email, created_at
            "#,
        )
        .bind(profile.id)
        .bind(&profile.club_name)
        .bind(&profile.email)
        .bind(profile.created_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(storage_error)?.into())
    }

    async fn update_club_name(
        &self,
        id: Uuid,
        club_name: &str,
    ) -> Result<OrganizerProfile, DomainError> {
        let timer = QueryTimer::new("update_organizer_club_name");
        let result = sqlx::query_as::<_, OrganizerProfileEntity>(
            r#"
            UPDATE organizer_profiles
            SET club_name = $2
            WHERE id = $1
            RETURNING id, club_name, email, created_at
            "#,
        )
        .bind(id)
        .bind(club_name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
            .map_err(storage_error)?
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found("Organizer"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let timer = QueryTimer::new("delete_organizer_profile");
        let result = sqlx::query("DELETE FROM organizer_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        if result.map_err(storage_error)?.rows_affected() == 0 {
            return Err(DomainError::not_found("Organizer"));
        }
        Ok(())
    }
}
