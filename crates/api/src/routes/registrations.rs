//! Registration ledger routes.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{Identity, RegistrantDetails, Registration, RegistrationEdit};
use domain::services::{
    authorize, edit_affordance, export_file_name, registrations_to_csv, Action, EditAffordance,
    Ownership,
};
use domain::DomainError;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentIdentity;
use crate::middleware::metrics::record_registration;
use crate::routes::events::load_event;

/// A registration with what its viewer may still do to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    #[serde(flatten)]
    pub registration: Registration,
    pub edit: EditAffordance,
}

impl RegistrationView {
    fn new(identity: &Identity, registration: Registration) -> Self {
        Self {
            edit: edit_affordance(identity, &registration),
            registration,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistrationsResponse {
    pub event_id: Uuid,
    pub event_title: String,
    pub registrations: Vec<Registration>,
    pub count: usize,
    pub max_registrations: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRegistration {
    #[serde(flatten)]
    pub view: RegistrationView,
    /// Absent only if the event vanished between the two reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRegistrationsResponse {
    pub registrations: Vec<MyRegistration>,
}

fn outcome_label(error: &DomainError) -> &'static str {
    match error {
        DomainError::CapacityExceeded { .. } => "capacity_exceeded",
        DomainError::NotEligible { .. } => "not_eligible",
        DomainError::NotFound(_) => "not_found",
        _ => "error",
    }
}

/// Registrations for an event, in the order they were taken.
///
/// GET /api/v1/events/:event_id/registrations
pub async fn list_for_event(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventRegistrationsResponse>, ApiError> {
    let event = load_event(&state, event_id).await?;
    authorize(
        &identity,
        Action::ViewRegistrations,
        Ownership::of_event(&identity, &event),
    )?;

    let registrations = state.events.list_by_event(event_id).await?;
    Ok(Json(EventRegistrationsResponse {
        event_id,
        event_title: event.title,
        count: registrations.len(),
        registrations,
        max_registrations: event.max_registrations,
    }))
}

/// GET /api/v1/events/:event_id/registrations/export
pub async fn export_csv(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(event_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let event = load_event(&state, event_id).await?;
    authorize(
        &identity,
        Action::ExportRegistrations,
        Ownership::of_event(&identity, &event),
    )?;

    let registrations = state.events.list_by_event(event_id).await?;
    let body = registrations_to_csv(&registrations);
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&event.title));
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::Internal(format!("Invalid export file name: {}", e)))?;

    tracing::info!(
        event_id = %event_id,
        user_id = %identity.user_id,
        rows = registrations.len(),
        "Registrations exported"
    );

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Registers the signed-in participant. Status and capacity are checked
/// atomically with the insert.
///
/// POST /api/v1/events/:event_id/registrations
pub async fn register(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(event_id): Path<Uuid>,
    Json(details): Json<RegistrantDetails>,
) -> Result<(StatusCode, Json<RegistrationView>), ApiError> {
    let event = load_event(&state, event_id).await?;
    authorize(&identity, Action::Register, Ownership::of_event(&identity, &event))?;
    details.validate()?;

    match state
        .events
        .register(event_id, details, &identity.email)
        .await
    {
        Ok(registration) => {
            record_registration("created");
            Ok((
                StatusCode::CREATED,
                Json(RegistrationView::new(&identity, registration)),
            ))
        }
        Err(e) => {
            record_registration(outcome_label(&e));
            Err(e.into())
        }
    }
}

/// The caller's own registrations across all events.
///
/// GET /api/v1/me/registrations
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<MyRegistrationsResponse>, ApiError> {
    authorize(
        &identity,
        Action::ViewOwnRegistrations,
        Ownership::NotApplicable,
    )?;

    let registrations = state.events.list_by_user(&identity.email).await?;
    let titles: HashMap<Uuid, String> = state
        .events
        .list_events()
        .await?
        .into_iter()
        .map(|e| (e.id, e.title))
        .collect();

    let registrations = registrations
        .into_iter()
        .map(|r| MyRegistration {
            event_title: titles.get(&r.event_id).cloned(),
            view: RegistrationView::new(&identity, r),
        })
        .collect();

    Ok(Json(MyRegistrationsResponse { registrations }))
}

/// The one-shot correction of name and college.
///
/// PATCH /api/v1/registrations/:registration_id
pub async fn edit_registration(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(registration_id): Path<Uuid>,
    Json(edit): Json<RegistrationEdit>,
) -> Result<Json<RegistrationView>, ApiError> {
    // Role gate only; ownership and the one-shot flag are checked by the ledger.
    authorize(&identity, Action::EditRegistration, Ownership::Owner)?;
    edit.validate()?;

    let registration = state
        .events
        .edit_registration(registration_id, edit, &identity.email)
        .await?;

    Ok(Json(RegistrationView::new(&identity, registration)))
}
