//! Score model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Score database model
///
/// At most one row exists per (participant, judge, round).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Score {
    pub id: i64,
    pub participant_id: i64,
    pub judge_id: i64,
    pub round_number: i32,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Score {
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            participant_id: self.participant_id,
            judge_id: self.judge_id,
            round_number: self.round_number,
        }
    }
}

/// Uniqueness key of the score ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScoreKey {
    pub participant_id: i64,
    pub judge_id: i64,
    pub round_number: i32,
}

/// Whether an upsert inserted a new row or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreAction {
    Created,
    Updated,
}

impl std::fmt::Display for ScoreAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
        }
    }
}
