//! Participant handler implementations

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::{
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    db::Repositories,
    error::AppResult,
    models::{BatchReport, Outcome},
    services::ParticipantService,
    state::AppState,
};

use super::{
    request::{
        BatchCreateParticipantsRequest, CreateParticipantRequest, ListParticipantsQuery,
        UpdateParticipantRequest,
    },
    response::{ParticipantResponse, ParticipantsListResponse},
};

/// Register a participant
pub async fn create_participant(
    State(state): State<AppState>,
    Json(payload): Json<CreateParticipantRequest>,
) -> AppResult<Json<Outcome<ParticipantResponse>>> {
    let result = ParticipantService::register(state.repos(), payload).await;

    Ok(Json(Outcome::capture(result, |p| {
        format!("Participant {} registered with QR code {}", p.name, p.qr_code_id)
    })?))
}

/// Register many participants at once
pub async fn batch_create_participants(
    State(state): State<AppState>,
    Json(payload): Json<BatchCreateParticipantsRequest>,
) -> AppResult<Json<BatchReport<ParticipantResponse>>> {
    let report = ParticipantService::batch_create(state.repos(), payload.participants).await?;
    Ok(Json(report))
}

/// List participants (paginated)
pub async fn list_participants(
    State(state): State<AppState>,
    Query(query): Query<ListParticipantsQuery>,
) -> AppResult<Json<ParticipantsListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let response =
        ParticipantService::list_participants(state.repos(), page, per_page, query.search).await?;
    Ok(Json(response))
}

/// Get a specific participant by ID
pub async fn get_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ParticipantResponse>> {
    let participant = ParticipantService::get_participant(state.repos(), id).await?;
    Ok(Json(participant.into()))
}

async fn update(
    repos: &Repositories,
    id: i64,
    payload: UpdateParticipantRequest,
) -> AppResult<ParticipantResponse> {
    payload.validate()?;
    let participant = ParticipantService::update_participant(repos, id, payload.into_changes()?).await?;
    Ok(participant.into())
}

/// Update participant details
pub async fn update_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateParticipantRequest>,
) -> AppResult<Json<Outcome<ParticipantResponse>>> {
    let result = update(state.repos(), id, payload).await;

    Ok(Json(Outcome::capture(result, |p| {
        format!("Participant {} updated", p.id)
    })?))
}

/// Participants not yet in any group
pub async fn list_ungrouped(State(state): State<AppState>) -> AppResult<Json<Vec<ParticipantResponse>>> {
    let participants = ParticipantService::list_ungrouped(state.repos()).await?;
    Ok(Json(participants))
}

/// Participants of one organization
pub async fn list_by_organization(
    State(state): State<AppState>,
    Path(organization): Path<String>,
) -> AppResult<Json<Vec<ParticipantResponse>>> {
    let participants = ParticipantService::list_by_organization(state.repos(), &organization).await?;
    Ok(Json(participants))
}
