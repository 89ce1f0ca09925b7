//! Score request DTOs

use serde::Deserialize;

use crate::constants::DEFAULT_ROUND_NUMBER;

/// Submit score request
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitScoreRequest {
    pub participant_id: i64,
    pub judge_id: i64,
    pub score: f64,
    pub round_number: Option<i32>,
}

impl SubmitScoreRequest {
    pub fn round(&self) -> i32 {
        self.round_number.unwrap_or(DEFAULT_ROUND_NUMBER)
    }
}

/// Batch score submission request
#[derive(Debug, Deserialize)]
pub struct BatchSubmitScoresRequest {
    pub scores: Vec<SubmitScoreRequest>,
}

/// Round selector shared by the read endpoints
#[derive(Debug, Deserialize)]
pub struct RoundQuery {
    pub round_number: Option<i32>,
}

impl RoundQuery {
    pub fn round(&self) -> i32 {
        self.round_number.unwrap_or(DEFAULT_ROUND_NUMBER)
    }
}
