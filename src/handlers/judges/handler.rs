//! Judge handler implementations

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::{
    db::Repositories,
    error::AppResult,
    models::{Judge, Outcome},
    services::JudgeService,
    state::AppState,
};

use super::{
    request::{CreateJudgeRequest, ListJudgesQuery, SetJudgeActiveRequest},
    response::JudgesListResponse,
};

async fn create(repos: &Repositories, payload: CreateJudgeRequest) -> AppResult<Judge> {
    payload.validate()?;
    JudgeService::create_judge(repos, payload.into_new_judge()?).await
}

/// Add a judge to the panel
pub async fn create_judge(
    State(state): State<AppState>,
    Json(payload): Json<CreateJudgeRequest>,
) -> AppResult<Json<Outcome<Judge>>> {
    let result = create(state.repos(), payload).await;
    Ok(Json(Outcome::capture(result, |j| format!("Judge {} created", j.name))?))
}

/// List judges, active ones only unless asked otherwise
pub async fn list_judges(
    State(state): State<AppState>,
    Query(query): Query<ListJudgesQuery>,
) -> AppResult<Json<JudgesListResponse>> {
    let judges = JudgeService::list_judges(state.repos(), query.include_inactive).await?;
    Ok(Json(JudgesListResponse {
        total: judges.len(),
        judges,
    }))
}

/// Get a specific judge by ID
pub async fn get_judge(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Judge>> {
    let judge = JudgeService::get_judge(state.repos(), id).await?;
    Ok(Json(judge))
}

/// Activate or deactivate a judge
pub async fn set_judge_active(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SetJudgeActiveRequest>,
) -> AppResult<Json<Outcome<Judge>>> {
    let result = JudgeService::set_active(state.repos(), id, payload.is_active).await;

    Ok(Json(Outcome::capture(result, |j| {
        if j.is_active {
            format!("Judge {} activated", j.id)
        } else {
            format!("Judge {} deactivated", j.id)
        }
    })?))
}
