//! Authentication service: accounts, password sign-in and token sessions.

use std::sync::Arc;

use chrono::Utc;
use domain::models::{Account, Identity, NewAccount, Role, Session};
use domain::services::IdentityProvider;
use domain::store::AccountStore;
use domain::DomainError;
use shared::crypto::session_token_hash;
use shared::jwt::{IssuedToken, JwtConfig, JwtError, TokenSubject};
use shared::password::{hash_password, validate_password_strength, verify_password, PasswordError};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Session not found")]
    SessionNotFound,

    #[error(transparent)]
    Domain(DomainError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Domain(other),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::InvalidToken | JwtError::DecodingError(_) => AuthError::InvalidToken,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooWeak(reason) => AuthError::WeakPassword(reason.to_string()),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: Uuid },
    SignedOut { user_id: Uuid },
    Refreshed { user_id: Uuid },
}

/// Result of a successful sign-in or sign-up.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub identity: Identity,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Result of a successful token refresh.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// A live session resolved from an access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub identity: Identity,
    pub session_id: Uuid,
}

const SESSION_EVENT_CAPACITY: usize = 64;

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    jwt: Arc<JwtConfig>,
    events: broadcast::Sender<SessionEvent>,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountStore>, jwt: JwtConfig) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            accounts,
            jwt: Arc::new(jwt),
            events,
        }
    }

    /// Receives every sign-in, sign-out and refresh from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Creates an account after checking password strength.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        role: Role,
        club_name: Option<&str>,
    ) -> Result<Account, AuthError> {
        validate_password_strength(password)?;
        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .create_account(NewAccount {
                email: shared::validation::normalize_email(email),
                password_hash,
                role,
                club_name: club_name.map(str::to_string),
            })
            .await?;

        tracing::info!(
            user_id = %account.id,
            role = %account.role,
            "Account created"
        );
        Ok(account)
    }

    /// Public self sign-up. Always creates a participant and signs it in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let account = self
            .create_account(email, password, Role::Participant, None)
            .await?;
        self.open_session(&account).await
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let account = self
            .accounts
            .find_account_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash)? {
            tracing::debug!(user_id = %account.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.open_session(&account).await
    }

    fn issue_tokens(&self, account: &Account) -> Result<(IssuedToken, IssuedToken), AuthError> {
        let subject = TokenSubject {
            account_id: account.id,
            email: &account.email,
            role: account.role.as_str(),
        };
        let access = self.jwt.generate_access_token(subject)?;
        let refresh = self.jwt.generate_refresh_token(subject)?;
        Ok((access, refresh))
    }

    async fn open_session(&self, account: &Account) -> Result<AuthSession, AuthError> {
        let (access, refresh) = self.issue_tokens(account)?;
        let now = Utc::now();

        self.accounts
            .create_session(Session {
                id: Uuid::new_v4(),
                account_id: account.id,
                access_token_hash: session_token_hash(&access.jti),
                refresh_token_hash: session_token_hash(&refresh.jti),
                expires_at: now + chrono::Duration::seconds(self.jwt.refresh_token_expiry_secs),
                created_at: now,
            })
            .await?;

        tracing::info!(user_id = %account.id, "Signed in");
        self.notify(SessionEvent::SignedIn {
            user_id: account.id,
        });

        Ok(AuthSession {
            identity: account.identity(),
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: access.expires_in,
        })
    }

    /// Resolves an access token to a live session.
    ///
    /// Role and club are read from the account on every call, so changes
    /// apply without signing in again.
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedSession, AuthError> {
        let claims = self.jwt.validate_access_token(access_token)?;

        let session = self
            .accounts
            .find_session_by_access_hash(&session_token_hash(&claims.jti))
            .await?
            .ok_or(AuthError::SessionNotFound)?;
        if session.is_expired(Utc::now()) {
            return Err(AuthError::SessionNotFound);
        }

        let account = self
            .accounts
            .find_account(session.account_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        Ok(AuthenticatedSession {
            identity: account.identity(),
            session_id: session.id,
        })
    }

    /// The identity behind `access_token`, or `None` when it has no live session.
    pub async fn current_session(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
        match self.authenticate(access_token).await {
            Ok(session) => Ok(Some(session.identity)),
            Err(AuthError::InvalidToken | AuthError::TokenExpired | AuthError::SessionNotFound) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Ends the session; its access token stops working immediately.
    pub async fn sign_out(&self, session: &AuthenticatedSession) -> Result<(), AuthError> {
        self.accounts.delete_session(session.session_id).await?;
        tracing::info!(user_id = %session.identity.user_id, "Signed out");
        self.notify(SessionEvent::SignedOut {
            user_id: session.identity.user_id,
        });
        Ok(())
    }

    /// Exchanges a refresh token for a new token pair, rotating both.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResult, AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidToken)?;

        let session = self
            .accounts
            .find_session_by_refresh_hash(&session_token_hash(&claims.jti))
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired(Utc::now()) {
            self.accounts.delete_session(session.id).await?;
            return Err(AuthError::SessionNotFound);
        }

        let account = self
            .accounts
            .find_account(session.account_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        let (access, refresh) = self.issue_tokens(&account)?;
        let expires_at = Utc::now() + chrono::Duration::seconds(self.jwt.refresh_token_expiry_secs);
        self.accounts
            .rotate_session(
                session.id,
                &session_token_hash(&access.jti),
                &session_token_hash(&refresh.jti),
                expires_at,
            )
            .await?;

        self.notify(SessionEvent::Refreshed {
            user_id: account.id,
        });

        Ok(RefreshResult {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: access.expires_in,
        })
    }

    /// Deletes expired sessions. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64, AuthError> {
        Ok(self.accounts.delete_expired_sessions(Utc::now()).await?)
    }

    pub fn accounts(&self) -> &Arc<dyn AccountStore> {
        &self.accounts
    }
}

fn into_domain(err: AuthError) -> DomainError {
    match err {
        AuthError::EmailTaken => {
            DomainError::Conflict("An account with this email already exists.".to_string())
        }
        AuthError::WeakPassword(reason) => DomainError::Validation(reason),
        AuthError::Domain(e) => e,
        other => DomainError::Storage(other.to_string()),
    }
}

#[async_trait::async_trait]
impl IdentityProvider for AuthService {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: Role,
        club_name: Option<&str>,
    ) -> Result<Identity, DomainError> {
        self.create_account(email, password, role, club_name)
            .await
            .map(|account| account.identity())
            .map_err(into_domain)
    }

    async fn update_club_name(&self, id: Uuid, club_name: &str) -> Result<(), DomainError> {
        self.accounts
            .update_account_club_name(id, Some(club_name))
            .await
            .map(|_| ())
    }

    async fn remove_identity(&self, id: Uuid) -> Result<(), DomainError> {
        self.accounts.delete_account(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::MemoryAccountStore;

    const SECRET: &str = "unit-test-secret-with-at-least-32-bytes";

    fn service() -> AuthService {
        let jwt = JwtConfig::from_secret(SECRET, 3600, 86400, 0).unwrap();
        AuthService::new(Arc::new(MemoryAccountStore::new()), jwt)
    }

    #[tokio::test]
    async fn test_sign_up_creates_participant() {
        let auth = service();
        let session = auth.sign_up("New@Mail.com", "Festival2024").await.unwrap();

        assert_eq!(session.identity.role, Role::Participant);
        assert_eq!(session.identity.email, "new@mail.com");
        let identity = auth.current_session(&session.access_token).await.unwrap();
        assert_eq!(identity.unwrap().user_id, session.identity.user_id);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_weak_password_and_duplicates() {
        let auth = service();
        assert!(matches!(
            auth.sign_up("a@mail.com", "password").await,
            Err(AuthError::WeakPassword(_))
        ));

        auth.sign_up("a@mail.com", "Festival2024").await.unwrap();
        assert!(matches!(
            auth.sign_up("A@mail.com", "Festival2024").await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let auth = service();
        auth.sign_up("a@mail.com", "Festival2024").await.unwrap();

        assert!(matches!(
            auth.sign_in_with_password("a@mail.com", "Wrong2024").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in_with_password("nobody@mail.com", "Festival2024").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(auth
            .sign_in_with_password(" A@Mail.com ", "Festival2024")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_sign_out_revokes_access_token() {
        let auth = service();
        let session = auth.sign_up("a@mail.com", "Festival2024").await.unwrap();
        let live = auth.authenticate(&session.access_token).await.unwrap();

        auth.sign_out(&live).await.unwrap();

        assert!(auth
            .current_session(&session.access_token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let auth = service();
        let session = auth.sign_up("a@mail.com", "Festival2024").await.unwrap();

        let refreshed = auth.refresh(&session.refresh_token).await.unwrap();

        assert!(auth
            .current_session(&session.access_token)
            .await
            .unwrap()
            .is_none());
        assert!(auth
            .current_session(&refreshed.access_token)
            .await
            .unwrap()
            .is_some());
        assert!(matches!(
            auth.refresh(&session.refresh_token).await,
            Err(AuthError::SessionNotFound)
        ));
        assert!(matches!(
            auth.refresh(&refreshed.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_identity_reflects_metadata_changes() {
        let auth = service();
        let account = auth
            .create_account("chess@college.edu", "Organizer1", Role::Organizer, Some("Chess"))
            .await
            .unwrap();
        let session = auth
            .sign_in_with_password("chess@college.edu", "Organizer1")
            .await
            .unwrap();

        IdentityProvider::update_club_name(&auth, account.id, "Chess Society")
            .await
            .unwrap();

        let identity = auth
            .current_session(&session.access_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(identity.club_name.as_deref(), Some("Chess Society"));
    }

    #[tokio::test]
    async fn test_session_events_are_broadcast() {
        let auth = service();
        let mut events = auth.subscribe();

        let session = auth.sign_up("a@mail.com", "Festival2024").await.unwrap();
        let user_id = session.identity.user_id;
        auth.refresh(&session.refresh_token).await.unwrap();

        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedIn { user_id });
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Refreshed { user_id });
    }

    #[tokio::test]
    async fn test_identity_provider_maps_errors() {
        let auth = service();
        IdentityProvider::sign_up(&auth, "a@college.edu", "Organizer1", Role::Organizer, Some("Chess"))
            .await
            .unwrap();

        let taken =
            IdentityProvider::sign_up(&auth, "a@college.edu", "Organizer1", Role::Organizer, None)
                .await;
        assert!(matches!(taken, Err(DomainError::Conflict(_))));

        let weak =
            IdentityProvider::sign_up(&auth, "b@college.edu", "organizer", Role::Organizer, None)
                .await;
        assert!(matches!(weak, Err(DomainError::Validation(_))));
    }
}
