//! Check-in service
//!
//! Attendance is a two-state machine per participant. Every transition is a
//! compare-and-set in the store, recorded in the append-only check-in log.

use std::collections::BTreeMap;

use crate::{
    constants::{ADMIN_SOURCE, DEFAULT_RECENT_CHECKINS, MAX_RECENT_CHECKINS, checkin_actions},
    db::Repositories,
    error::{AppError, AppResult},
    handlers::checkin::response::{
        CheckinResult, CheckinStatistics, CheckinStatusResponse, OrganizationCheckin, QrCodeInfo,
    },
    models::{CheckinContext, CheckinLog, Participant},
    utils::{now_utc, percentage, sanitize_string},
};

fn admin_context(note: Option<String>) -> CheckinContext {
    CheckinContext {
        source: Some(ADMIN_SOURCE.to_string()),
        note: note.map(|n| sanitize_string(&n)).filter(|n| !n.is_empty()),
    }
}

/// Check-in service for business logic
pub struct CheckinService;

impl CheckinService {
    /// Self-service check-in with QR code, phone suffix and name
    pub async fn verify_checkin(
        repos: &Repositories,
        qr_code_id: &str,
        phone_last4: &str,
        name: &str,
        source: Option<String>,
    ) -> AppResult<CheckinResult> {
        let participant = repos
            .participants
            .find_by_qr_code(qr_code_id.trim())
            .await?
            .filter(|p| p.matches_identity(phone_last4, name))
            .ok_or(AppError::IdentityVerificationFailed)?;

        let context = CheckinContext { source, note: None };
        Self::check_in(repos, participant, checkin_actions::CHECK_IN, &context).await
    }

    /// Admin check-in without identity factors
    pub async fn manual_checkin(
        repos: &Repositories,
        participant_id: i64,
        note: Option<String>,
    ) -> AppResult<CheckinResult> {
        let participant = repos
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(AppError::ParticipantNotFound(participant_id))?;

        let context = admin_context(note);
        Self::check_in(repos, participant, checkin_actions::MANUAL_CHECK_IN, &context).await
    }

    async fn check_in(
        repos: &Repositories,
        participant: Participant,
        action: &str,
        context: &CheckinContext,
    ) -> AppResult<CheckinResult> {
        if participant.is_checked_in {
            return Err(AppError::AlreadyCheckedIn {
                checkin_time: participant.checkin_time,
            });
        }

        let transition = repos
            .checkins
            .record_checkin(participant.id, action, now_utc(), context)
            .await?;

        let Some(transition) = transition else {
            // Someone else checked the participant in since it was read.
            let checkin_time = repos
                .participants
                .find_by_id(participant.id)
                .await?
                .and_then(|p| p.checkin_time);
            return Err(AppError::AlreadyCheckedIn { checkin_time });
        };

        tracing::info!(
            participant_id = participant.id,
            action,
            source = context.source.as_deref().unwrap_or("-"),
            "Participant checked in"
        );
        Ok(transition.into())
    }

    /// Admin cancellation of a check-in; earlier events stay in the log
    pub async fn cancel_checkin(
        repos: &Repositories,
        participant_id: i64,
        note: Option<String>,
    ) -> AppResult<CheckinResult> {
        let participant = repos
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(AppError::ParticipantNotFound(participant_id))?;

        if !participant.is_checked_in {
            return Err(AppError::NotCheckedIn);
        }

        let transition = repos
            .checkins
            .record_cancellation(participant_id, now_utc(), &admin_context(note))
            .await?
            .ok_or(AppError::NotCheckedIn)?;

        tracing::info!(participant_id, "Check-in cancelled");
        Ok(transition.into())
    }

    /// Pre-check of a scanned code, without revealing who it belongs to
    pub async fn qr_code_info(repos: &Repositories, qr_code_id: &str) -> AppResult<QrCodeInfo> {
        let qr_code_id = qr_code_id.trim();
        let participant = repos.participants.find_by_qr_code(qr_code_id).await?;

        Ok(QrCodeInfo {
            qr_code_id: qr_code_id.to_string(),
            participant_exists: participant.is_some(),
            is_checked_in: participant.as_ref().is_some_and(|p| p.is_checked_in),
            checkin_time: participant.and_then(|p| p.checkin_time),
        })
    }

    /// Attendance state and event history of one participant
    pub async fn status(repos: &Repositories, participant_id: i64) -> AppResult<CheckinStatusResponse> {
        let participant = repos
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(AppError::ParticipantNotFound(participant_id))?;
        let history = repos.checkins.list_for_participant(participant_id).await?;

        Ok(CheckinStatusResponse {
            checkin_status: participant.checkin_state(),
            checkin_time: participant.checkin_time,
            participant: participant.into(),
            history,
        })
    }

    /// Latest check-in events across all participants
    pub async fn recent(repos: &Repositories, limit: Option<i64>) -> AppResult<Vec<CheckinLog>> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_CHECKINS)
            .clamp(1, MAX_RECENT_CHECKINS);
        repos.checkins.list_recent(limit).await
    }

    /// Attendance overall and per organization
    pub async fn statistics(repos: &Repositories) -> AppResult<CheckinStatistics> {
        let participants = repos.participants.list_all().await?;

        let mut per_organization: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
        for participant in &participants {
            let entry = per_organization
                .entry(participant.organization.as_str())
                .or_insert((0, 0));
            entry.0 += 1;
            if participant.is_checked_in {
                entry.1 += 1;
            }
        }

        let total_participants = participants.len() as i64;
        let checked_in_participants = participants.iter().filter(|p| p.is_checked_in).count() as i64;

        Ok(CheckinStatistics {
            total_participants,
            checked_in_participants,
            checkin_rate: percentage(checked_in_participants, total_participants),
            organizations: per_organization
                .into_iter()
                .map(|(organization, (total, checked_in))| OrganizationCheckin {
                    organization: organization.to_string(),
                    total,
                    checked_in,
                    checkin_rate: percentage(checked_in, total),
                })
                .collect(),
        })
    }
}
