//! Check-in response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    handlers::participants::ParticipantResponse,
    models::{CheckinLog, CheckinState, CheckinTransition},
};

/// A completed check-in or cancellation
#[derive(Debug, Serialize)]
pub struct CheckinResult {
    pub participant: ParticipantResponse,
    pub checkin_time: Option<DateTime<Utc>>,
    pub event: CheckinLog,
}

impl From<CheckinTransition> for CheckinResult {
    fn from(transition: CheckinTransition) -> Self {
        Self {
            checkin_time: transition.participant.checkin_time,
            participant: transition.participant.into(),
            event: transition.event,
        }
    }
}

/// What the check-in page may show before identity is verified
#[derive(Debug, Serialize)]
pub struct QrCodeInfo {
    pub qr_code_id: String,
    pub participant_exists: bool,
    pub is_checked_in: bool,
    pub checkin_time: Option<DateTime<Utc>>,
}

/// Attendance state of a participant with the full event history
#[derive(Debug, Serialize)]
pub struct CheckinStatusResponse {
    pub participant: ParticipantResponse,
    pub checkin_status: CheckinState,
    pub checkin_time: Option<DateTime<Utc>>,
    /// Newest first
    pub history: Vec<CheckinLog>,
}

/// Attendance of one organization
#[derive(Debug, Serialize)]
pub struct OrganizationCheckin {
    pub organization: String,
    pub total: i64,
    pub checked_in: i64,
    pub checkin_rate: f64,
}

/// Attendance across all participants
#[derive(Debug, Serialize)]
pub struct CheckinStatistics {
    pub total_participants: i64,
    pub checked_in_participants: i64,
    pub checkin_rate: f64,
    pub organizations: Vec<OrganizationCheckin>,
}
