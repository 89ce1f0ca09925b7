//! Process-local store
//!
//! Implements every repository port over plain collections behind one async
//! mutex. Each trait method takes the lock once, so the compare-and-set
//! transitions and upserts are atomic exactly as their SQL counterparts are.
//! Used by tests and by `STORAGE=memory`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::repositories::{
    CheckinRepository, GroupRepository, JudgeRepository, ParticipantRepository, ScoreRepository,
};
use crate::{
    constants::checkin_actions,
    error::{AppError, AppResult},
    models::{
        CheckinContext, CheckinLog, CheckinTransition, DrawAssignment, Group, GroupChanges, Judge,
        NewGroup, NewJudge, NewParticipant, Participant, ParticipantChanges, Score, ScoreAction,
        ScoreKey,
    },
    utils::now_utc,
};

#[derive(Default)]
struct Sequences {
    participant: i64,
    group: i64,
    judge: i64,
    score: i64,
    checkin_log: i64,
}

impl Sequences {
    fn next(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

#[derive(Default)]
struct MemoryState {
    participants: BTreeMap<i64, Participant>,
    groups: BTreeMap<i64, Group>,
    judges: BTreeMap<i64, Judge>,
    scores: BTreeMap<i64, Score>,
    score_index: HashMap<ScoreKey, i64>,
    checkin_logs: Vec<CheckinLog>,
    sequences: Sequences,
}

impl MemoryState {
    fn append_event(
        &mut self,
        participant_id: i64,
        action: &str,
        at: DateTime<Utc>,
        context: &CheckinContext,
    ) -> CheckinLog {
        let event = CheckinLog {
            id: Sequences::next(&mut self.sequences.checkin_log),
            participant_id,
            action: action.to_string(),
            occurred_at: at,
            source: context.source.clone(),
            note: context.note.clone(),
        };
        self.checkin_logs.push(event.clone());
        event
    }
}

/// In-memory implementation of all repository ports
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(a: &CheckinLog, b: &CheckinLog) -> std::cmp::Ordering {
    b.occurred_at.cmp(&a.occurred_at).then(b.id.cmp(&a.id))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[async_trait]
impl ParticipantRepository for MemoryStore {
    async fn create(&self, participant: &NewParticipant, qr_code_id: &str) -> AppResult<Participant> {
        let mut state = self.state.lock().await;

        if state.participants.values().any(|p| p.qr_code_id == qr_code_id) {
            return Err(AppError::AlreadyExists(format!("QR code {qr_code_id}")));
        }

        let now = now_utc();
        let id = Sequences::next(&mut state.sequences.participant);
        let participant = Participant {
            id,
            name: participant.name.clone(),
            organization: participant.organization.clone(),
            phone: participant.phone.clone(),
            phone_last4: participant.phone_last4(),
            group_id: participant.group_id,
            qr_code_id: qr_code_id.to_string(),
            is_checked_in: false,
            checkin_time: None,
            created_at: now,
            updated_at: now,
        };
        state.participants.insert(id, participant.clone());

        Ok(participant)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>> {
        Ok(self.state.lock().await.participants.get(&id).cloned())
    }

    async fn find_by_qr_code(&self, qr_code_id: &str) -> AppResult<Option<Participant>> {
        let state = self.state.lock().await;
        Ok(state
            .participants
            .values()
            .find(|p| p.qr_code_id == qr_code_id)
            .cloned())
    }

    async fn qr_code_exists(&self, qr_code_id: &str) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state.participants.values().any(|p| p.qr_code_id == qr_code_id))
    }

    async fn list(
        &self,
        offset: i64,
        limit: i64,
        search: Option<String>,
    ) -> AppResult<(Vec<Participant>, i64)> {
        let state = self.state.lock().await;
        let needle = search.map(|s| s.to_lowercase());

        let matching: Vec<&Participant> = state
            .participants
            .values()
            .filter(|p| match &needle {
                Some(n) => {
                    contains_ignore_case(&p.name, n)
                        || contains_ignore_case(&p.organization, n)
                        || contains_ignore_case(&p.phone, n)
                }
                None => true,
            })
            .collect();

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn list_all(&self) -> AppResult<Vec<Participant>> {
        Ok(self.state.lock().await.participants.values().cloned().collect())
    }

    async fn list_ungrouped(&self) -> AppResult<Vec<Participant>> {
        let state = self.state.lock().await;
        Ok(state
            .participants
            .values()
            .filter(|p| p.group_id.is_none())
            .cloned()
            .collect())
    }

    async fn list_by_organization(&self, organization: &str) -> AppResult<Vec<Participant>> {
        let state = self.state.lock().await;
        Ok(state
            .participants
            .values()
            .filter(|p| p.organization == organization)
            .cloned()
            .collect())
    }

    async fn list_by_group(&self, group_id: i64) -> AppResult<Vec<Participant>> {
        let state = self.state.lock().await;
        Ok(state
            .participants
            .values()
            .filter(|p| p.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().await.participants.len() as i64)
    }

    async fn update(&self, id: i64, changes: &ParticipantChanges) -> AppResult<Option<Participant>> {
        let mut state = self.state.lock().await;
        let Some(participant) = state.participants.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            participant.name = name.clone();
        }
        if let Some(organization) = &changes.organization {
            participant.organization = organization.clone();
        }
        if let Some(phone) = &changes.phone {
            participant.phone = phone.clone();
        }
        if let Some(last4) = changes.phone_last4() {
            participant.phone_last4 = last4;
        }
        participant.updated_at = now_utc();

        Ok(Some(participant.clone()))
    }

    async fn set_group(&self, id: i64, group_id: Option<i64>) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.participants.get_mut(&id) {
            Some(participant) => {
                participant.group_id = group_id;
                participant.updated_at = now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn assign_group(&self, ids: &[i64], group_id: i64) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = now_utc();
        let mut moved = 0;
        for id in ids {
            if let Some(participant) = state.participants.get_mut(id) {
                participant.group_id = Some(group_id);
                participant.updated_at = now;
                moved += 1;
            }
        }
        Ok(moved)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: &NewGroup) -> AppResult<Group> {
        let mut state = self.state.lock().await;
        let now = now_utc();
        let id = Sequences::next(&mut state.sequences.group);
        let group = Group {
            id,
            name: group.name.clone(),
            description: group.description.clone(),
            draw_order: None,
            created_at: now,
            updated_at: now,
        };
        state.groups.insert(id, group.clone());

        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Group>> {
        Ok(self.state.lock().await.groups.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Group>> {
        let state = self.state.lock().await;
        let mut groups: Vec<Group> = state.groups.values().cloned().collect();
        groups.sort_by_key(|g| (g.draw_order.is_none(), g.draw_order, g.id));
        Ok(groups)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().await.groups.len() as i64)
    }

    async fn update(&self, id: i64, changes: &GroupChanges) -> AppResult<Option<Group>> {
        let mut state = self.state.lock().await;
        let Some(group) = state.groups.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            group.name = name.clone();
        }
        if let Some(description) = &changes.description {
            group.description = Some(description.clone());
        }
        group.updated_at = now_utc();

        Ok(Some(group.clone()))
    }

    async fn replace_draw_orders(&self, assignments: &[DrawAssignment]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let now = now_utc();

        for group in state.groups.values_mut() {
            group.draw_order = None;
        }
        for assignment in assignments {
            if let Some(group) = state.groups.get_mut(&assignment.group_id) {
                group.draw_order = Some(assignment.draw_order);
                group.updated_at = now;
            }
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.groups.remove(&id).is_none() {
            return Ok(false);
        }

        let now = now_utc();
        for participant in state.participants.values_mut() {
            if participant.group_id == Some(id) {
                participant.group_id = None;
                participant.updated_at = now;
            }
        }

        Ok(true)
    }
}

#[async_trait]
impl JudgeRepository for MemoryStore {
    async fn create(&self, judge: &NewJudge) -> AppResult<Judge> {
        let mut state = self.state.lock().await;
        let now = now_utc();
        let id = Sequences::next(&mut state.sequences.judge);
        let judge = Judge {
            id,
            name: judge.name.clone(),
            organization: judge.organization.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.judges.insert(id, judge.clone());

        Ok(judge)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Judge>> {
        Ok(self.state.lock().await.judges.get(&id).cloned())
    }

    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Judge>> {
        let state = self.state.lock().await;
        Ok(state
            .judges
            .values()
            .filter(|j| include_inactive || j.is_active)
            .cloned()
            .collect())
    }

    async fn set_active(&self, id: i64, is_active: bool) -> AppResult<Option<Judge>> {
        let mut state = self.state.lock().await;
        Ok(state.judges.get_mut(&id).map(|judge| {
            judge.is_active = is_active;
            judge.updated_at = now_utc();
            judge.clone()
        }))
    }

    async fn count_active(&self) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state.judges.values().filter(|j| j.is_active).count() as i64)
    }
}

#[async_trait]
impl ScoreRepository for MemoryStore {
    async fn find_by_key(&self, key: ScoreKey) -> AppResult<Option<Score>> {
        let state = self.state.lock().await;
        Ok(state
            .score_index
            .get(&key)
            .and_then(|id| state.scores.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Score>> {
        Ok(self.state.lock().await.scores.get(&id).cloned())
    }

    async fn upsert(&self, key: ScoreKey, score: f64) -> AppResult<(Score, ScoreAction)> {
        let mut state = self.state.lock().await;
        let now = now_utc();

        if let Some(id) = state.score_index.get(&key).copied() {
            if let Some(existing) = state.scores.get_mut(&id) {
                existing.score = score;
                existing.updated_at = now;
                return Ok((existing.clone(), ScoreAction::Updated));
            }
        }

        let id = Sequences::next(&mut state.sequences.score);
        let row = Score {
            id,
            participant_id: key.participant_id,
            judge_id: key.judge_id,
            round_number: key.round_number,
            score,
            created_at: now,
            updated_at: now,
        };
        state.scores.insert(id, row.clone());
        state.score_index.insert(key, id);

        Ok((row, ScoreAction::Created))
    }

    async fn list_by_participant(&self, participant_id: i64, round_number: i32) -> AppResult<Vec<Score>> {
        let state = self.state.lock().await;
        let mut scores: Vec<Score> = state
            .scores
            .values()
            .filter(|s| s.participant_id == participant_id && s.round_number == round_number)
            .cloned()
            .collect();
        scores.sort_by_key(|s| s.judge_id);
        Ok(scores)
    }

    async fn list_by_judge(&self, judge_id: i64, round_number: i32) -> AppResult<Vec<Score>> {
        let state = self.state.lock().await;
        let mut scores: Vec<Score> = state
            .scores
            .values()
            .filter(|s| s.judge_id == judge_id && s.round_number == round_number)
            .cloned()
            .collect();
        scores.sort_by_key(|s| s.participant_id);
        Ok(scores)
    }

    async fn list_by_round(&self, round_number: i32) -> AppResult<Vec<Score>> {
        let state = self.state.lock().await;
        Ok(state
            .scores
            .values()
            .filter(|s| s.round_number == round_number)
            .cloned()
            .collect())
    }

    async fn count_by_round(&self, round_number: i32) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .scores
            .values()
            .filter(|s| s.round_number == round_number)
            .count() as i64)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.scores.remove(&id) {
            Some(score) => {
                state.score_index.remove(&score.key());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CheckinRepository for MemoryStore {
    async fn record_checkin(
        &self,
        participant_id: i64,
        action: &str,
        at: DateTime<Utc>,
        context: &CheckinContext,
    ) -> AppResult<Option<CheckinTransition>> {
        let mut state = self.state.lock().await;

        let participant = match state.participants.get_mut(&participant_id) {
            Some(p) if !p.is_checked_in => {
                p.is_checked_in = true;
                p.checkin_time = Some(at);
                p.updated_at = now_utc();
                p.clone()
            }
            _ => return Ok(None),
        };

        let event = state.append_event(participant_id, action, at, context);
        Ok(Some(CheckinTransition { participant, event }))
    }

    async fn record_cancellation(
        &self,
        participant_id: i64,
        at: DateTime<Utc>,
        context: &CheckinContext,
    ) -> AppResult<Option<CheckinTransition>> {
        let mut state = self.state.lock().await;

        let participant = match state.participants.get_mut(&participant_id) {
            Some(p) if p.is_checked_in => {
                p.is_checked_in = false;
                p.checkin_time = None;
                p.updated_at = now_utc();
                p.clone()
            }
            _ => return Ok(None),
        };

        let event = state.append_event(participant_id, checkin_actions::CANCEL, at, context);
        Ok(Some(CheckinTransition { participant, event }))
    }

    async fn list_for_participant(&self, participant_id: i64) -> AppResult<Vec<CheckinLog>> {
        let state = self.state.lock().await;
        let mut events: Vec<CheckinLog> = state
            .checkin_logs
            .iter()
            .filter(|e| e.participant_id == participant_id)
            .cloned()
            .collect();
        events.sort_by(newest_first);
        Ok(events)
    }

    async fn list_recent(&self, limit: i64) -> AppResult<Vec<CheckinLog>> {
        let state = self.state.lock().await;
        let mut events = state.checkin_logs.clone();
        events.sort_by(newest_first);
        events.truncate(limit.max(0) as usize);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_participant(name: &str, organization: &str) -> NewParticipant {
        NewParticipant {
            name: name.to_string(),
            organization: organization.to_string(),
            phone: "13812345678".to_string(),
            group_id: None,
        }
    }

    #[tokio::test]
    async fn test_qr_code_is_unique() {
        let store = MemoryStore::new();
        ParticipantRepository::create(&store, &new_participant("A", "X"), "QR001")
            .await
            .unwrap();

        let err = ParticipantRepository::create(&store, &new_participant("B", "X"), "QR001")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_key() {
        let store = MemoryStore::new();
        let key = ScoreKey {
            participant_id: 1,
            judge_id: 2,
            round_number: 1,
        };

        let (first, action) = store.upsert(key, 7.0).await.unwrap();
        assert_eq!(action, ScoreAction::Created);
        let (second, action) = store.upsert(key, 8.5).await.unwrap();
        assert_eq!(action, ScoreAction::Updated);

        assert_eq!(first.id, second.id);
        assert_eq!(store.count_by_round(1).await.unwrap(), 1);
        assert_eq!(store.find_by_key(key).await.unwrap().unwrap().score, 8.5);
    }

    #[tokio::test]
    async fn test_checkin_is_compare_and_set() {
        let store = MemoryStore::new();
        let participant = ParticipantRepository::create(&store, &new_participant("A", "X"), "QR001")
            .await
            .unwrap();
        let at = now_utc();
        let context = CheckinContext::default();

        let first = store
            .record_checkin(participant.id, checkin_actions::CHECK_IN, at, &context)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .record_checkin(participant.id, checkin_actions::CHECK_IN, at, &context)
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(store.list_for_participant(participant.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_group_delete_orphans_members() {
        let store = MemoryStore::new();
        let group = GroupRepository::create(
            &store,
            &NewGroup {
                name: "Group 1".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        let participant = ParticipantRepository::create(&store, &new_participant("A", "X"), "QR001")
            .await
            .unwrap();
        store.set_group(participant.id, Some(group.id)).await.unwrap();

        assert!(GroupRepository::delete(&store, group.id).await.unwrap());
        let reloaded = ParticipantRepository::find_by_id(&store, participant.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.group_id, None);
    }
}
