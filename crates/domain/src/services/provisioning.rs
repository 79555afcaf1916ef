//! Organizer administration: creating, renaming and removing club accounts.
//!
//! Provisioning touches two stores that cannot share a transaction (the
//! identity provider and the profile store), so it runs as a two-step saga
//! with a compensating identity removal.

use std::sync::Arc;

use chrono::Utc;
use shared::validation::{normalize_club_name, normalize_email};
use uuid::Uuid;

use crate::error::{DomainError, CLUB_NAME_TAKEN};
use crate::models::{
    CreateOrganizerRequest, Identity, OrganizerProfile, RenameOutcome, Role,
    UpdateOrganizerRequest,
};
use crate::store::ProfileStore;

/// The identity side of organizer provisioning.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a login. Fails with `Conflict` when the email is taken.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: Role,
        club_name: Option<&str>,
    ) -> Result<Identity, DomainError>;

    async fn update_club_name(&self, id: Uuid, club_name: &str) -> Result<(), DomainError>;

    async fn remove_identity(&self, id: Uuid) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct OrganizerAdministration {
    identities: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl OrganizerAdministration {
    pub fn new(identities: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            identities,
            profiles,
        }
    }

    pub async fn list(&self) -> Result<Vec<OrganizerProfile>, DomainError> {
        self.profiles.list().await
    }

    /// Creates the organizer identity, then its profile.
    ///
    /// A profile failure removes the identity again. If that removal also
    /// fails the result is `PartialProvisioning` naming the orphan.
    pub async fn provision(
        &self,
        request: CreateOrganizerRequest,
    ) -> Result<OrganizerProfile, DomainError> {
        let club_name = normalize_club_name(&request.club_name);
        let email = normalize_email(&request.email);

        if self.profiles.find_by_club_name(&club_name).await?.is_some() {
            return Err(DomainError::Conflict(CLUB_NAME_TAKEN.to_string()));
        }

        let identity = self
            .identities
            .sign_up(&email, &request.password, Role::Organizer, Some(&club_name))
            .await?;

        let profile = OrganizerProfile {
            id: identity.user_id,
            club_name,
            email: identity.email.clone(),
            created_at: Utc::now(),
        };

        match self.profiles.insert(profile).await {
            Ok(profile) => {
                tracing::info!(
                    organizer_id = %profile.id,
                    club_name = %profile.club_name,
                    "Organizer provisioned"
                );
                Ok(profile)
            }
            Err(e) => Err(self.compensate(&identity, e).await),
        }
    }

    async fn compensate(&self, identity: &Identity, cause: DomainError) -> DomainError {
        tracing::warn!(
            identity_id = %identity.user_id,
            error = %cause,
            "Organizer profile insert failed, removing identity"
        );
        match self.identities.remove_identity(identity.user_id).await {
            Ok(()) => cause,
            Err(removal) => {
                tracing::error!(
                    identity_id = %identity.user_id,
                    email = %identity.email,
                    error = %removal,
                    "Compensation failed; organizer identity left without a profile"
                );
                DomainError::PartialProvisioning {
                    identity_id: identity.user_id,
                    email: identity.email.clone(),
                    reason: cause.to_string(),
                }
            }
        }
    }

    /// Renames the club on the profile, then on the identity.
    ///
    /// Events already created keep the club name they were created with.
    pub async fn rename(
        &self,
        id: Uuid,
        request: UpdateOrganizerRequest,
    ) -> Result<RenameOutcome, DomainError> {
        let club_name = normalize_club_name(&request.club_name);

        self.profiles
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Organizer"))?;

        if let Some(holder) = self.profiles.find_by_club_name(&club_name).await? {
            if holder.id != id {
                return Err(DomainError::Conflict(CLUB_NAME_TAKEN.to_string()));
            }
        }

        let profile = self.profiles.update_club_name(id, &club_name).await?;

        let outcome = match self.identities.update_club_name(id, &club_name).await {
            Ok(()) => RenameOutcome {
                profile,
                metadata_synced: true,
                warning: None,
            },
            Err(e) => {
                tracing::warn!(
                    organizer_id = %id,
                    error = %e,
                    "Club renamed but identity metadata was not updated"
                );
                RenameOutcome {
                    profile,
                    metadata_synced: false,
                    warning: Some(format!(
                        "Club name updated, but the organizer's account could not be synced: {}",
                        e
                    )),
                }
            }
        };
        Ok(outcome)
    }

    /// Deletes the profile. The identity stays and must be removed out of band.
    pub async fn remove(&self, id: Uuid) -> Result<(), DomainError> {
        self.profiles.delete(id).await?;
        tracing::info!(organizer_id = %id, "Organizer profile removed");
        Ok(())
    }
}

impl std::fmt::Debug for OrganizerAdministration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizerAdministration").finish_non_exhaustive()
    }
}
