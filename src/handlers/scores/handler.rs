//! Score handler implementations

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{BatchReport, Outcome},
    services::ScoreService,
    state::AppState,
};

use super::{
    request::{BatchSubmitScoresRequest, RoundQuery, SubmitScoreRequest},
    response::{
        AverageResponse, DeletedScore, JudgeScoresResponse, NextParticipantResponse,
        ParticipantScoreDetail, ProgressResponse, RankingResponse, ScoreStatistics, ScoreSubmission,
    },
};

/// Submit or overwrite a score
pub async fn submit_score(
    State(state): State<AppState>,
    Json(payload): Json<SubmitScoreRequest>,
) -> AppResult<Json<Outcome<ScoreSubmission>>> {
    let result = ScoreService::submit_score(
        state.repos(),
        payload.participant_id,
        payload.judge_id,
        payload.score,
        payload.round(),
    )
    .await;

    Ok(Json(Outcome::capture(result, |s| {
        format!("Score {} {}", s.score.id, s.action)
    })?))
}

/// Submit many scores at once
pub async fn batch_submit_scores(
    State(state): State<AppState>,
    Json(payload): Json<BatchSubmitScoresRequest>,
) -> AppResult<Json<BatchReport<ScoreSubmission>>> {
    let report = ScoreService::batch_submit(state.repos(), payload.scores).await?;
    Ok(Json(report))
}

/// Mean score of a participant
pub async fn get_average(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RoundQuery>,
) -> AppResult<Json<AverageResponse>> {
    let average = ScoreService::average(state.repos(), id, query.round()).await?;
    Ok(Json(average))
}

/// Leaderboard of a round
pub async fn get_ranking(
    State(state): State<AppState>,
    Query(query): Query<RoundQuery>,
) -> AppResult<Json<RankingResponse>> {
    let ranking = ScoreService::ranking(state.repos(), query.round()).await?;
    Ok(Json(ranking))
}

/// Scoring completion of a round
pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<RoundQuery>,
) -> AppResult<Json<ProgressResponse>> {
    let progress = ScoreService::progress(state.repos(), query.round()).await?;
    Ok(Json(progress))
}

/// Per-judge scores of a participant
pub async fn get_participant_scores(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RoundQuery>,
) -> AppResult<Json<ParticipantScoreDetail>> {
    let detail = ScoreService::participant_detail(state.repos(), id, query.round()).await?;
    Ok(Json(detail))
}

/// Scores given by a judge
pub async fn get_judge_scores(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RoundQuery>,
) -> AppResult<Json<JudgeScoresResponse>> {
    let scores = ScoreService::judge_scores(state.repos(), id, query.round()).await?;
    Ok(Json(scores))
}

/// Next participant the judge still has to score
pub async fn get_next_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RoundQuery>,
) -> AppResult<Json<NextParticipantResponse>> {
    let next = ScoreService::next_participant(state.repos(), id, query.round()).await?;
    Ok(Json(next))
}

/// Aggregate figures of a round
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(query): Query<RoundQuery>,
) -> AppResult<Json<ScoreStatistics>> {
    let statistics = ScoreService::statistics(state.repos(), query.round()).await?;
    Ok(Json(statistics))
}

/// Remove a score
pub async fn delete_score(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Outcome<DeletedScore>>> {
    let result = ScoreService::delete_score(state.repos(), id)
        .await
        .map(|score_id| DeletedScore { score_id });

    Ok(Json(Outcome::capture(result, |d| format!("Score {} deleted", d.score_id))?))
}
