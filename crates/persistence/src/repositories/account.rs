//! Account and session repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{Account, NewAccount, Session};
use domain::store::AccountStore;
use domain::DomainError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AccountEntity, SessionEntity};
use crate::error::storage_error;
use crate::metrics::QueryTimer;

/// Postgres-backed [`AccountStore`].
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Creates a new AccountRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for AccountRepository {
    async fn create_account(&self, account: NewAccount) -> Result<Account, DomainError> {
        let timer = QueryTimer::new("create_account");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            INSERT INTO accounts (id, email, password_hash, role, club_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, role, club_name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(shared::validation::normalize_email(&account.email))
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(&account.club_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Account::try_from(result.map_err(storage_error)?)
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        let timer = QueryTimer::new("find_account");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, email, password_hash, role, club_name, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
            .map_err(storage_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let timer = QueryTimer::new("find_account_by_email");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, email, password_hash, role, club_name, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(shared::validation::normalize_email(email))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
            .map_err(storage_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn update_account_club_name(
        &self,
        id: Uuid,
        club_name: Option<&str>,
    ) -> Result<Account, DomainError> {
        let timer = QueryTimer::new("update_account_club_name");
        let result = sqlx::query_as::<_, AccountEntity>(
            r#"
            UPDATE accounts
            SET club_name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, role, club_name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(club_name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
            .map_err(storage_error)?
            .ok_or_else(|| DomainError::not_found("Account"))
            .and_then(Account::try_from)
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), DomainError> {
        let timer = QueryTimer::new("delete_account");
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        if result.map_err(storage_error)?.rows_affected() == 0 {
            return Err(DomainError::not_found("Account"));
        }
        Ok(())
    }

    async fn create_session(&self, session: Session) -> Result<Session, DomainError> {
        let timer = QueryTimer::new("create_session");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            INSERT INTO sessions (id, account_id, access_token_hash, refresh_token_hash,
                                  expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, account_id, access_token_hash, refresh_token_hash, expires_at, created_at
            "#,
        )
        .bind(session.id)
        .bind(session.account_id)
        .bind(&session.access_token_hash)
        .bind(&session.refresh_token_hash)
        .bind(session.expires_at)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(storage_error)?.into())
    }

    async fn find_session_by_access_hash(
        &self,
        access_token_hash: &str,
    ) -> Result<Option<Session>, DomainError> {
        let timer = QueryTimer::new("find_session_by_access_hash");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            SELECT id, account_id, access_token_hash, refresh_token_hash, expires_at, created_at
            FROM sessions
            WHERE access_token_hash = $1
            "#,
        )
        .bind(access_token_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(storage_error)?.map(Into::into))
    }

    async fn find_session_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<Session>, DomainError> {
        let timer = QueryTimer::new("find_session_by_refresh_hash");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            SELECT id, account_id, access_token_hash, refresh_token_hash, expires_at, created_at
            FROM sessions
            WHERE refresh_token_hash = $1
            "#,
        )
        .bind(refresh_token_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(storage_error)?.map(Into::into))
    }

    async fn rotate_session(
        &self,
        id: Uuid,
        access_token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, DomainError> {
        let timer = QueryTimer::new("rotate_session");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            UPDATE sessions
            SET access_token_hash = $2, refresh_token_hash = $3, expires_at = $4
            WHERE id = $1
            RETURNING id, account_id, access_token_hash, refresh_token_hash, expires_at, created_at
            "#,
        )
        .bind(id)
        .bind(access_token_hash)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
            .map_err(storage_error)?
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found("Session"))
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), DomainError> {
        let timer = QueryTimer::new("delete_session");
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map_err(storage_error)?;
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let timer = QueryTimer::new("delete_expired_sessions");
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(storage_error)?.rows_affected())
    }
}
