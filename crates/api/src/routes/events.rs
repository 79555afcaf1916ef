//! Event catalog routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{Event, EventDetails, Identity, StatusChange};
use domain::services::{
    allows, authorize, group_by_club, registration_affordance, Action, ClubEvents, EventSummary,
    Ownership, RegistrationAffordance,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentIdentity;

/// An event as the caller sees it: live counts plus what they may do with it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub summary: EventSummary,
    pub registration: RegistrationAffordance,
    pub can_manage: bool,
}

impl EventView {
    pub fn new(identity: &Identity, event: Event, registration_count: i64) -> Self {
        let ownership = Ownership::of_event(identity, &event);
        let registration = registration_affordance(identity, &event, registration_count);
        Self {
            can_manage: allows(identity.role, Action::EditEvent, ownership),
            registration,
            summary: EventSummary::new(event, registration_count),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    pub clubs: Vec<ClubEvents<EventView>>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventResponse {
    pub id: Uuid,
    pub registrations_removed: usize,
}

/// Loads an event or fails with 404.
pub(crate) async fn load_event(state: &AppState, event_id: Uuid) -> Result<Event, ApiError> {
    state
        .events
        .find_event(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}

async fn view_of(state: &AppState, identity: &Identity, event: Event) -> Result<EventView, ApiError> {
    let count = state.events.count_by_event(event.id).await?;
    Ok(EventView::new(identity, event, count))
}

/// All events grouped by club, earliest first.
///
/// GET /api/v1/events
pub async fn list_events(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<EventListResponse>, ApiError> {
    authorize(&identity, Action::ViewEvents, Ownership::NotApplicable)?;

    let events = state.events.list_events().await?;
    let counts = state.events.registration_counts().await?;
    let total = events.len();

    let clubs = group_by_club(&events)
        .into_iter()
        .map(|group| ClubEvents {
            club_name: group.club_name,
            events: group
                .events
                .into_iter()
                .map(|event| {
                    let count = counts.get(&event.id).copied().unwrap_or(0);
                    EventView::new(&identity, event, count)
                })
                .collect(),
        })
        .collect();

    Ok(Json(EventListResponse { clubs, total }))
}

/// GET /api/v1/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventView>, ApiError> {
    authorize(&identity, Action::ViewEvents, Ownership::NotApplicable)?;

    let event = load_event(&state, event_id).await?;
    Ok(Json(view_of(&state, &identity, event).await?))
}

/// The event belongs to the caller's club and starts OPEN.
///
/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(details): Json<EventDetails>,
) -> Result<(StatusCode, Json<EventView>), ApiError> {
    authorize(&identity, Action::CreateEvent, Ownership::NotApplicable)?;
    details.validate()?;

    let event = state.events.create_event(details, &identity).await?;
    Ok((StatusCode::CREATED, Json(EventView::new(&identity, event, 0))))
}

/// Replaces the editable fields. A limit below the current count is refused.
///
/// PUT /api/v1/events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(event_id): Path<Uuid>,
    Json(details): Json<EventDetails>,
) -> Result<Json<EventView>, ApiError> {
    let event = load_event(&state, event_id).await?;
    authorize(&identity, Action::EditEvent, Ownership::of_event(&identity, &event))?;
    details.validate()?;

    let event = state.events.update_event(event_id, details).await?;
    Ok(Json(view_of(&state, &identity, event).await?))
}

/// POST /api/v1/events/:event_id/status
pub async fn change_status(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(event_id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> Result<Json<EventView>, ApiError> {
    let event = load_event(&state, event_id).await?;
    authorize(
        &identity,
        Action::ChangeEventStatus,
        Ownership::of_event(&identity, &event),
    )?;

    let event = state.events.set_status(event_id, change.status).await?;
    Ok(Json(view_of(&state, &identity, event).await?))
}

/// Deletes the event together with all of its registrations.
///
/// DELETE /api/v1/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(event_id): Path<Uuid>,
) -> Result<Json<DeleteEventResponse>, ApiError> {
    let event = load_event(&state, event_id).await?;
    authorize(&identity, Action::DeleteEvent, Ownership::of_event(&identity, &event))?;

    let registrations_removed = state.events.delete_event(event_id).await?;
    Ok(Json(DeleteEventResponse {
        id: event_id,
        registrations_removed,
    }))
}
