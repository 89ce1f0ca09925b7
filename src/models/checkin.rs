//! Check-in audit log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Append-only check-in event
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct CheckinLog {
    pub id: i64,
    pub participant_id: i64,
    /// One of `constants::checkin_actions`
    pub action: String,
    pub occurred_at: DateTime<Utc>,
    /// Client address, or `ADMIN` for console actions
    pub source: Option<String>,
    pub note: Option<String>,
}

/// Participant row after a state transition, with the event that recorded it
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinTransition {
    pub participant: super::Participant,
    pub event: CheckinLog,
}

/// Caller metadata recorded alongside a transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckinContext {
    pub source: Option<String>,
    pub note: Option<String>,
}
