//! Database repositories
//!
//! Repositories are the storage ports of the application. Services only see
//! these traits; [`crate::db::Repositories`] wires in either the PostgreSQL
//! implementations below or the in-memory store.

pub mod checkin_repo;
pub mod group_repo;
pub mod judge_repo;
pub mod participant_repo;
pub mod score_repo;

pub use checkin_repo::PgCheckinRepository;
pub use group_repo::PgGroupRepository;
pub use judge_repo::PgJudgeRepository;
pub use participant_repo::PgParticipantRepository;
pub use score_repo::PgScoreRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{
        CheckinContext, CheckinLog, CheckinTransition, DrawAssignment, Group, GroupChanges, Judge,
        NewGroup, NewJudge, NewParticipant, Participant, ParticipantChanges, Score, ScoreAction,
        ScoreKey,
    },
};

/// Participant storage
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Insert a participant; `qr_code_id` must be unused
    async fn create(&self, participant: &NewParticipant, qr_code_id: &str) -> AppResult<Participant>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>>;

    async fn find_by_qr_code(&self, qr_code_id: &str) -> AppResult<Option<Participant>>;

    async fn qr_code_exists(&self, qr_code_id: &str) -> AppResult<bool>;

    /// Page through participants in id order, optionally filtered by a
    /// substring of name, organization or phone
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        search: Option<String>,
    ) -> AppResult<(Vec<Participant>, i64)>;

    async fn list_all(&self) -> AppResult<Vec<Participant>>;

    /// Participants without a group, in record order
    async fn list_ungrouped(&self) -> AppResult<Vec<Participant>>;

    async fn list_by_organization(&self, organization: &str) -> AppResult<Vec<Participant>>;

    async fn list_by_group(&self, group_id: i64) -> AppResult<Vec<Participant>>;

    async fn count(&self) -> AppResult<i64>;

    /// Apply a partial update; a new phone also replaces `phone_last4`
    async fn update(&self, id: i64, changes: &ParticipantChanges) -> AppResult<Option<Participant>>;

    /// Move one participant into a group, or out of any group with `None`
    async fn set_group(&self, id: i64, group_id: Option<i64>) -> AppResult<bool>;

    /// Move several participants into one group, returning the number moved
    async fn assign_group(&self, ids: &[i64], group_id: i64) -> AppResult<u64>;
}

/// Group storage
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: &NewGroup) -> AppResult<Group>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Group>>;

    /// All groups, drawn groups first in draw order, then by id
    async fn list(&self) -> AppResult<Vec<Group>>;

    async fn count(&self) -> AppResult<i64>;

    async fn update(&self, id: i64, changes: &GroupChanges) -> AppResult<Option<Group>>;

    /// Clear every draw order and write the given ones, atomically
    async fn replace_draw_orders(&self, assignments: &[DrawAssignment]) -> AppResult<()>;

    /// Delete a group, leaving its members ungrouped
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Judge storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JudgeRepository: Send + Sync {
    async fn create(&self, judge: &NewJudge) -> AppResult<Judge>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Judge>>;

    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Judge>>;

    async fn set_active(&self, id: i64, is_active: bool) -> AppResult<Option<Judge>>;

    async fn count_active(&self) -> AppResult<i64>;
}

/// Score ledger storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    async fn find_by_key(&self, key: ScoreKey) -> AppResult<Option<Score>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Score>>;

    /// Insert or overwrite the row for `key`; concurrent calls for one key
    /// leave exactly one row
    async fn upsert(&self, key: ScoreKey, score: f64) -> AppResult<(Score, ScoreAction)>;

    async fn list_by_participant(&self, participant_id: i64, round_number: i32) -> AppResult<Vec<Score>>;

    async fn list_by_judge(&self, judge_id: i64, round_number: i32) -> AppResult<Vec<Score>>;

    async fn list_by_round(&self, round_number: i32) -> AppResult<Vec<Score>>;

    async fn count_by_round(&self, round_number: i32) -> AppResult<i64>;

    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Attendance storage
///
/// Transitions are compare-and-set on the participant row and append their
/// event in the same transaction. `None` means the participant was not in the
/// required state (or does not exist).
#[async_trait]
pub trait CheckinRepository: Send + Sync {
    async fn record_checkin(
        &self,
        participant_id: i64,
        action: &str,
        at: DateTime<Utc>,
        context: &CheckinContext,
    ) -> AppResult<Option<CheckinTransition>>;

    async fn record_cancellation(
        &self,
        participant_id: i64,
        at: DateTime<Utc>,
        context: &CheckinContext,
    ) -> AppResult<Option<CheckinTransition>>;

    /// Events for one participant, newest first
    async fn list_for_participant(&self, participant_id: i64) -> AppResult<Vec<CheckinLog>>;

    /// Latest events across all participants, newest first
    async fn list_recent(&self, limit: i64) -> AppResult<Vec<CheckinLog>>;
}
