//! Admin bootstrap for initial setup.
//!
//! Creates the first admin account on startup when configured. Admins are
//! never created through public sign-up, so this is the only way in.

use domain::models::{NewAccount, Role};
use domain::store::AccountStore;
use domain::DomainError;
use shared::password::{hash_password, PasswordError};
use shared::validation::normalize_email;
use tracing::{info, warn};

use crate::config::AdminConfig;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Storage error: {0}")]
    Storage(#[from] DomainError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// Outcome of a bootstrap attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyExists,
    Created,
}

/// Creates the configured admin account unless it already exists.
///
/// Idempotent. Safe to call on every startup.
pub async fn bootstrap_admin(
    accounts: &dyn AccountStore,
    config: &AdminConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    let email = normalize_email(&config.bootstrap_email);
    if email.is_empty() {
        return Ok(BootstrapOutcome::NotConfigured);
    }

    if config.bootstrap_password.is_empty() {
        warn!(
            "EVENTS__ADMIN__BOOTSTRAP_EMAIL is set but EVENTS__ADMIN__BOOTSTRAP_PASSWORD is empty - skipping bootstrap"
        );
        return Ok(BootstrapOutcome::NotConfigured);
    }

    if accounts.find_account_by_email(&email).await?.is_some() {
        info!("Bootstrap admin account already exists - skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    let password_hash = hash_password(&config.bootstrap_password)?;
    let account = accounts
        .create_account(NewAccount {
            email,
            password_hash,
            role: Role::Admin,
            club_name: None,
        })
        .await?;

    info!(
        email = %account.email,
        user_id = %account.id,
        "Bootstrap admin account created"
    );
    warn!(
        "SECURITY: Remove EVENTS__ADMIN__BOOTSTRAP_EMAIL and EVENTS__ADMIN__BOOTSTRAP_PASSWORD \
         from configuration after initial setup"
    );

    Ok(BootstrapOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::MemoryAccountStore;

    fn config(email: &str, password: &str) -> AdminConfig {
        AdminConfig {
            bootstrap_email: email.to_string(),
            bootstrap_password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_skips_when_not_configured() {
        let store = MemoryAccountStore::new();
        assert_eq!(
            bootstrap_admin(&store, &config("", "")).await.unwrap(),
            BootstrapOutcome::NotConfigured
        );
        assert_eq!(
            bootstrap_admin(&store, &config("admin@college.edu", ""))
                .await
                .unwrap(),
            BootstrapOutcome::NotConfigured
        );
    }

    #[tokio::test]
    async fn test_creates_admin_once() {
        let store = MemoryAccountStore::new();
        let config = config(" Admin@College.edu ", "Admin2025!");

        assert_eq!(
            bootstrap_admin(&store, &config).await.unwrap(),
            BootstrapOutcome::Created
        );
        assert_eq!(
            bootstrap_admin(&store, &config).await.unwrap(),
            BootstrapOutcome::AlreadyExists
        );

        let admin = store
            .find_account_by_email("admin@college.edu")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.club_name, None);
    }
}
