//! Role-specific dashboard views.

use axum::{extract::State, Json};
use domain::models::Role;
use domain::services::{
    authorize, group_by_club, split_mine_and_others, summarize, Action, ClubEvents, EventSummary,
    Ownership,
};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentIdentity;

/// Organizers see their own events apart from everyone else's; admins see
/// every event grouped by club.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum DashboardResponse {
    Organizer {
        mine: Vec<EventSummary>,
        others: Vec<EventSummary>,
    },
    Admin {
        clubs: Vec<ClubEvents<EventSummary>>,
    },
}

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<DashboardResponse>, ApiError> {
    authorize(&identity, Action::ViewDashboard, Ownership::NotApplicable)?;

    let events = state.events.list_events().await?;
    let counts = state.events.registration_counts().await?;

    let response = match identity.role {
        Role::Admin => DashboardResponse::Admin {
            clubs: group_by_club(&events)
                .into_iter()
                .map(|group| ClubEvents {
                    club_name: group.club_name,
                    events: summarize(group.events, &counts),
                })
                .collect(),
        },
        _ => {
            let (mine, others) = split_mine_and_others(&events, identity.user_id);
            DashboardResponse::Organizer {
                mine: summarize(mine, &counts),
                others: summarize(others, &counts),
            }
        }
    };

    Ok(Json(response))
}
