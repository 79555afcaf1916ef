//! Administrator management of organizer accounts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateOrganizerRequest, OrganizerProfile, RenameOutcome, UpdateOrganizerRequest};
use domain::services::{authorize, Action, Ownership};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentIdentity;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerListResponse {
    pub organizers: Vec<OrganizerProfile>,
}

/// GET /api/v1/admin/organizers
pub async fn list_organizers(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<OrganizerListResponse>, ApiError> {
    authorize(&identity, Action::ManageOrganizers, Ownership::NotApplicable)?;

    let organizers = state.organizers.list().await?;
    Ok(Json(OrganizerListResponse { organizers }))
}

/// Creates the organizer account and its profile.
///
/// POST /api/v1/admin/organizers
pub async fn create_organizer(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(request): Json<CreateOrganizerRequest>,
) -> Result<(StatusCode, Json<OrganizerProfile>), ApiError> {
    authorize(&identity, Action::ManageOrganizers, Ownership::NotApplicable)?;
    request.validate()?;

    let profile = state.organizers.provision(request).await?;
    tracing::info!(
        admin_id = %identity.user_id,
        organizer_id = %profile.id,
        "Organizer created by admin"
    );
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Renames the organizer's club.
///
/// PUT /api/v1/admin/organizers/:organizer_id
pub async fn update_organizer(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(organizer_id): Path<Uuid>,
    Json(request): Json<UpdateOrganizerRequest>,
) -> Result<Json<RenameOutcome>, ApiError> {
    authorize(&identity, Action::ManageOrganizers, Ownership::NotApplicable)?;
    request.validate()?;

    Ok(Json(state.organizers.rename(organizer_id, request).await?))
}

/// Deletes the profile. The login account is kept.
///
/// DELETE /api/v1/admin/organizers/:organizer_id
pub async fn delete_organizer(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(organizer_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authorize(&identity, Action::ManageOrganizers, Ownership::NotApplicable)?;

    state.organizers.remove(organizer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
