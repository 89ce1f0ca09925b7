//! Check-in handler implementations

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use validator::Validate;

use crate::{
    db::Repositories,
    error::AppResult,
    models::{CheckinLog, Outcome},
    services::CheckinService,
    state::AppState,
};

use super::{
    request::{AdminCheckinRequest, RecentCheckinsQuery, VerifyCheckinRequest},
    response::{CheckinResult, CheckinStatistics, CheckinStatusResponse, QrCodeInfo},
};

/// First address of `X-Forwarded-For`, if the request came through a proxy
fn client_source(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn checked_in_message(result: &CheckinResult) -> String {
    format!("{} checked in", result.participant.name)
}

async fn verify(
    repos: &Repositories,
    payload: VerifyCheckinRequest,
    source: Option<String>,
) -> AppResult<CheckinResult> {
    payload.validate()?;
    CheckinService::verify_checkin(
        repos,
        &payload.qr_code_id,
        &payload.phone_last4,
        &payload.name,
        source,
    )
    .await
}

/// Self-service check-in by QR code, phone suffix and name
pub async fn verify_checkin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<VerifyCheckinRequest>,
) -> AppResult<Json<Outcome<CheckinResult>>> {
    let result = verify(state.repos(), payload, client_source(&headers)).await;
    Ok(Json(Outcome::capture(result, checked_in_message)?))
}

/// Check a participant in from the admin console
pub async fn manual_checkin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminCheckinRequest>,
) -> AppResult<Json<Outcome<CheckinResult>>> {
    let result = match payload.validate() {
        Ok(()) => CheckinService::manual_checkin(state.repos(), id, payload.note).await,
        Err(e) => Err(e.into()),
    };
    Ok(Json(Outcome::capture(result, checked_in_message)?))
}

/// Undo a participant's check-in
pub async fn cancel_checkin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminCheckinRequest>,
) -> AppResult<Json<Outcome<CheckinResult>>> {
    let result = match payload.validate() {
        Ok(()) => CheckinService::cancel_checkin(state.repos(), id, payload.note).await,
        Err(e) => Err(e.into()),
    };

    Ok(Json(Outcome::capture(result, |r| {
        format!("Check-in of {} cancelled", r.participant.name)
    })?))
}

/// Look up a scanned QR code before asking for identity factors
pub async fn get_qr_code_info(
    State(state): State<AppState>,
    Path(qr_code_id): Path<String>,
) -> AppResult<Json<QrCodeInfo>> {
    let info = CheckinService::qr_code_info(state.repos(), &qr_code_id).await?;
    Ok(Json(info))
}

/// Attendance state and history of a participant
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CheckinStatusResponse>> {
    let status = CheckinService::status(state.repos(), id).await?;
    Ok(Json(status))
}

/// Latest check-in events
pub async fn list_recent(
    State(state): State<AppState>,
    Query(query): Query<RecentCheckinsQuery>,
) -> AppResult<Json<Vec<CheckinLog>>> {
    let events = CheckinService::recent(state.repos(), query.limit).await?;
    Ok(Json(events))
}

/// Attendance overall and per organization
pub async fn get_statistics(State(state): State<AppState>) -> AppResult<Json<CheckinStatistics>> {
    let statistics = CheckinService::statistics(state.repos()).await?;
    Ok(Json(statistics))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_client_source_takes_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_source(&headers), None);

        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.7, 172.16.0.1"));
        assert_eq!(client_source(&headers).as_deref(), Some("10.0.0.7"));
    }
}
