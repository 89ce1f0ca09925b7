//! Participant response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CheckinState, Participant};

/// Participant response
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResponse {
    pub id: i64,
    pub name: String,
    pub organization: String,
    pub phone: String,
    pub phone_last4: String,
    pub group_id: Option<i64>,
    pub qr_code_id: String,
    pub checkin_status: CheckinState,
    pub is_checked_in: bool,
    pub checkin_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            checkin_status: p.checkin_state(),
            id: p.id,
            name: p.name,
            organization: p.organization,
            phone: p.phone,
            phone_last4: p.phone_last4,
            group_id: p.group_id,
            qr_code_id: p.qr_code_id,
            is_checked_in: p.is_checked_in,
            checkin_time: p.checkin_time,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Participant list response
#[derive(Debug, Serialize)]
pub struct ParticipantsListResponse {
    pub participants: Vec<ParticipantResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}
