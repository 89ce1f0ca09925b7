//! Score response DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    handlers::participants::ParticipantResponse,
    models::{Judge, Score, ScoreAction},
};

/// Result of a score submission
#[derive(Debug, Serialize)]
pub struct ScoreSubmission {
    pub score: Score,
    pub action: ScoreAction,
}

/// Mean score of one participant in a round
#[derive(Debug, Serialize)]
pub struct AverageResponse {
    pub participant_id: i64,
    pub round_number: i32,
    /// `None` when no judge has scored the participant yet
    pub average_score: Option<f64>,
    pub score_count: usize,
}

/// One row of the leaderboard
#[derive(Debug, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub participant_id: i64,
    pub participant_name: String,
    pub organization: String,
    pub group_id: Option<i64>,
    pub average_score: f64,
    pub score_count: usize,
    pub total_judges: i64,
}

/// Leaderboard of a round
#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub round_number: i32,
    pub ranking: Vec<RankingEntry>,
}

/// Scores received by one participant
#[derive(Debug, Serialize)]
pub struct ParticipantProgress {
    pub participant_id: i64,
    pub participant_name: String,
    pub received_scores: i64,
    pub completion_rate: f64,
}

/// Scores given by one active judge
#[derive(Debug, Serialize)]
pub struct JudgeProgress {
    pub judge_id: i64,
    pub judge_name: String,
    pub given_scores: i64,
    pub completion_rate: f64,
}

/// Scoring progress of a round
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub round_number: i32,
    pub total_participants: i64,
    pub total_judges: i64,
    pub expected_scores: i64,
    pub submitted_scores: i64,
    /// submitted / expected, 0 when nothing is expected
    pub completion: f64,
    /// `completion` as a percentage
    pub completion_rate: f64,
    pub participant_progress: Vec<ParticipantProgress>,
    pub judge_progress: Vec<JudgeProgress>,
}

/// One judge's score within a participant's detail
#[derive(Debug, Serialize)]
pub struct JudgeScoreEntry {
    pub score_id: i64,
    pub judge_id: i64,
    pub judge_name: Option<String>,
    pub judge_organization: Option<String>,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All scores of one participant in a round
#[derive(Debug, Serialize)]
pub struct ParticipantScoreDetail {
    pub participant: ParticipantResponse,
    pub round_number: i32,
    pub scores: Vec<JudgeScoreEntry>,
    pub average_score: Option<f64>,
    pub score_count: usize,
    pub total_judges: i64,
}

/// All scores given by one judge in a round
#[derive(Debug, Serialize)]
pub struct JudgeScoresResponse {
    pub judge: Judge,
    pub round_number: i32,
    pub scores: Vec<Score>,
}

/// The next participant a judge still has to score
#[derive(Debug, Serialize)]
pub struct NextParticipantResponse {
    pub judge_id: i64,
    pub round_number: i32,
    /// `None` once the judge has scored everyone
    pub participant: Option<ParticipantResponse>,
    pub remaining: usize,
}

/// Aggregate figures over every score of a round
#[derive(Debug, Serialize)]
pub struct ScoreStatistics {
    pub round_number: i32,
    pub total_scores: usize,
    pub average_score: Option<f64>,
    pub highest_score: Option<f64>,
    pub lowest_score: Option<f64>,
    /// Count of scores per whole point (0-10)
    pub score_distribution: BTreeMap<u8, usize>,
}

/// Acknowledgement of a score deletion
#[derive(Debug, Serialize)]
pub struct DeletedScore {
    pub score_id: i64,
}
