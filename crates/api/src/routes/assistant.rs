//! Assistant routes: description drafts and event Q&A.
//!
//! Generation problems come back as placeholder text with a 200, never as errors.

use axum::{extract::State, Json};
use domain::services::{authorize, Action, Ownership};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentIdentity;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DescribeRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeResponse {
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Question must be 1-1000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub question: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
}

/// Drafts a description for an event title.
///
/// POST /api/v1/assistant/describe
pub async fn describe(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(request): Json<DescribeRequest>,
) -> Result<Json<DescribeResponse>, ApiError> {
    authorize(&identity, Action::GenerateDescription, Ownership::NotApplicable)?;
    request.validate()?;

    let description = state.assistant.describe_event(&request.title).await;
    Ok(Json(DescribeResponse { description }))
}

/// Answers from the current event catalog only.
///
/// POST /api/v1/assistant/ask
pub async fn ask(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    authorize(&identity, Action::AskAssistant, Ownership::NotApplicable)?;
    request.validate()?;

    let events = state.events.list_events().await?;
    let answer = state
        .assistant
        .answer_question(&events, &request.question)
        .await;
    Ok(Json(AskResponse { answer }))
}
