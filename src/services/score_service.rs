//! Score service

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    constants::{MAX_BATCH_SIZE, MAX_SCORE},
    db::Repositories,
    error::{AppError, AppResult},
    handlers::scores::{
        request::SubmitScoreRequest,
        response::{
            AverageResponse, JudgeProgress, JudgeScoreEntry, JudgeScoresResponse,
            NextParticipantResponse, ParticipantProgress, ParticipantScoreDetail, ProgressResponse,
            RankingEntry, RankingResponse, ScoreStatistics, ScoreSubmission,
        },
    },
    models::{BatchReport, Score, ScoreKey},
    utils::{percentage, ratio, round_display, validate_round, validate_score},
};

/// Mean score of one participant, before display rounding
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAverage {
    pub rank: usize,
    pub participant_id: i64,
    pub average: f64,
    pub score_count: usize,
}

/// Arithmetic mean, `None` for no values
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Rank participants by mean score, highest first.
///
/// Equal means are ordered by ascending participant id; ranks are the
/// positions 1..n.
pub fn rank_by_average(scores: &[Score]) -> Vec<RankedAverage> {
    let mut per_participant: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for score in scores {
        per_participant
            .entry(score.participant_id)
            .or_default()
            .push(score.score);
    }

    let mut averages: Vec<(i64, f64, usize)> = per_participant
        .into_iter()
        .filter_map(|(id, values)| mean(&values).map(|avg| (id, avg, values.len())))
        .collect();

    averages.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    averages
        .into_iter()
        .enumerate()
        .map(|(index, (participant_id, average, score_count))| RankedAverage {
            rank: index + 1,
            participant_id,
            average,
            score_count,
        })
        .collect()
}

/// Count scores per whole point
fn score_distribution(values: &[f64]) -> BTreeMap<u8, usize> {
    let mut distribution = BTreeMap::new();
    for value in values {
        let bucket = value.clamp(0.0, MAX_SCORE).floor() as u8;
        *distribution.entry(bucket).or_insert(0) += 1;
    }
    distribution
}

/// Score service for business logic
pub struct ScoreService;

impl ScoreService {
    /// Record a judge's score for a participant, overwriting any earlier one
    /// for the same round
    pub async fn submit_score(
        repos: &Repositories,
        participant_id: i64,
        judge_id: i64,
        score: f64,
        round_number: i32,
    ) -> AppResult<ScoreSubmission> {
        validate_score(score)?;
        validate_round(round_number)?;

        repos
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(AppError::ParticipantNotFound(participant_id))?;

        let judge = repos
            .judges
            .find_by_id(judge_id)
            .await?
            .ok_or(AppError::JudgeNotFound(judge_id))?;
        if !judge.is_active {
            return Err(AppError::JudgeInactive(judge_id));
        }

        let key = ScoreKey {
            participant_id,
            judge_id,
            round_number,
        };
        let (score, action) = repos.scores.upsert(key, score).await?;

        tracing::info!(
            participant_id,
            judge_id,
            round_number,
            score = score.score,
            %action,
            "Score recorded"
        );

        Ok(ScoreSubmission { score, action })
    }

    /// Submit many scores; each item succeeds or fails on its own
    pub async fn batch_submit(
        repos: &Repositories,
        requests: Vec<SubmitScoreRequest>,
    ) -> AppResult<BatchReport<ScoreSubmission>> {
        if requests.len() > MAX_BATCH_SIZE {
            return Err(AppError::Validation(format!(
                "At most {MAX_BATCH_SIZE} scores per batch"
            )));
        }

        let mut report = BatchReport::new();
        for (index, request) in requests.into_iter().enumerate() {
            let result = Self::submit_score(
                repos,
                request.participant_id,
                request.judge_id,
                request.score,
                request.round(),
            )
            .await;

            match result {
                Err(e) if !e.is_domain() => return Err(e),
                result => report.record(index, result),
            }
        }

        tracing::info!(
            success_count = report.success_count,
            error_count = report.error_count,
            "Batch score submission finished"
        );
        Ok(report)
    }

    /// Mean of a participant's scores in a round
    pub async fn average(
        repos: &Repositories,
        participant_id: i64,
        round_number: i32,
    ) -> AppResult<AverageResponse> {
        let scores = repos
            .scores
            .list_by_participant(participant_id, round_number)
            .await?;
        let values: Vec<f64> = scores.iter().map(|s| s.score).collect();

        Ok(AverageResponse {
            participant_id,
            round_number,
            average_score: mean(&values).map(round_display),
            score_count: values.len(),
        })
    }

    /// Leaderboard of every participant scored at least once in the round
    pub async fn ranking(repos: &Repositories, round_number: i32) -> AppResult<RankingResponse> {
        let scores = repos.scores.list_by_round(round_number).await?;
        let total_judges = repos.judges.count_active().await?;
        let participants: HashMap<i64, _> = repos
            .participants
            .list_all()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let ranking = rank_by_average(&scores)
            .into_iter()
            .filter_map(|ranked| {
                let participant = participants.get(&ranked.participant_id)?;
                Some(RankingEntry {
                    rank: ranked.rank,
                    participant_id: participant.id,
                    participant_name: participant.name.clone(),
                    organization: participant.organization.clone(),
                    group_id: participant.group_id,
                    average_score: round_display(ranked.average),
                    score_count: ranked.score_count,
                    total_judges,
                })
            })
            .collect();

        Ok(RankingResponse {
            round_number,
            ranking,
        })
    }

    /// Submitted versus expected scores, overall and per participant and judge
    pub async fn progress(repos: &Repositories, round_number: i32) -> AppResult<ProgressResponse> {
        let participants = repos.participants.list_all().await?;
        let judges = repos.judges.list(false).await?;
        let scores = repos.scores.list_by_round(round_number).await?;
        let submitted_scores = repos.scores.count_by_round(round_number).await?;

        let total_participants = participants.len() as i64;
        let total_judges = judges.len() as i64;
        let expected_scores = total_participants * total_judges;

        let mut received: HashMap<i64, i64> = HashMap::new();
        let mut given: HashMap<i64, i64> = HashMap::new();
        for score in &scores {
            *received.entry(score.participant_id).or_insert(0) += 1;
            *given.entry(score.judge_id).or_insert(0) += 1;
        }

        let participant_progress = participants
            .iter()
            .map(|p| {
                let received_scores = received.get(&p.id).copied().unwrap_or(0);
                ParticipantProgress {
                    participant_id: p.id,
                    participant_name: p.name.clone(),
                    received_scores,
                    completion_rate: percentage(received_scores, total_judges),
                }
            })
            .collect();

        let judge_progress = judges
            .iter()
            .map(|j| {
                let given_scores = given.get(&j.id).copied().unwrap_or(0);
                JudgeProgress {
                    judge_id: j.id,
                    judge_name: j.name.clone(),
                    given_scores,
                    completion_rate: percentage(given_scores, total_participants),
                }
            })
            .collect();

        Ok(ProgressResponse {
            round_number,
            total_participants,
            total_judges,
            expected_scores,
            submitted_scores,
            completion: ratio(submitted_scores, expected_scores),
            completion_rate: percentage(submitted_scores, expected_scores),
            participant_progress,
            judge_progress,
        })
    }

    /// Every judge's score for one participant, with the mean
    pub async fn participant_detail(
        repos: &Repositories,
        participant_id: i64,
        round_number: i32,
    ) -> AppResult<ParticipantScoreDetail> {
        let participant = repos
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(AppError::ParticipantNotFound(participant_id))?;

        let scores = repos
            .scores
            .list_by_participant(participant_id, round_number)
            .await?;
        let judges: HashMap<i64, _> = repos
            .judges
            .list(true)
            .await?
            .into_iter()
            .map(|j| (j.id, j))
            .collect();
        let total_judges = repos.judges.count_active().await?;

        let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
        let entries = scores
            .into_iter()
            .map(|s| {
                let judge = judges.get(&s.judge_id);
                JudgeScoreEntry {
                    score_id: s.id,
                    judge_id: s.judge_id,
                    judge_name: judge.map(|j| j.name.clone()),
                    judge_organization: judge.and_then(|j| j.organization.clone()),
                    score: s.score,
                    created_at: s.created_at,
                    updated_at: s.updated_at,
                }
            })
            .collect();

        Ok(ParticipantScoreDetail {
            participant: participant.into(),
            round_number,
            scores: entries,
            average_score: mean(&values).map(round_display),
            score_count: values.len(),
            total_judges,
        })
    }

    /// Scores given by one judge in a round
    pub async fn judge_scores(
        repos: &Repositories,
        judge_id: i64,
        round_number: i32,
    ) -> AppResult<JudgeScoresResponse> {
        let judge = repos
            .judges
            .find_by_id(judge_id)
            .await?
            .ok_or(AppError::JudgeNotFound(judge_id))?;
        let scores = repos.scores.list_by_judge(judge_id, round_number).await?;

        Ok(JudgeScoresResponse {
            judge,
            round_number,
            scores,
        })
    }

    /// First participant, in performance order, the judge has not scored yet.
    ///
    /// Members of drawn groups come first by draw order; everyone else follows
    /// by id.
    pub async fn next_participant(
        repos: &Repositories,
        judge_id: i64,
        round_number: i32,
    ) -> AppResult<NextParticipantResponse> {
        repos
            .judges
            .find_by_id(judge_id)
            .await?
            .ok_or(AppError::JudgeNotFound(judge_id))?;

        let scored: HashSet<i64> = repos
            .scores
            .list_by_judge(judge_id, round_number)
            .await?
            .into_iter()
            .map(|s| s.participant_id)
            .collect();

        let draw_orders: HashMap<i64, i32> = repos
            .groups
            .list()
            .await?
            .into_iter()
            .filter_map(|g| g.draw_order.map(|order| (g.id, order)))
            .collect();

        let mut pending: Vec<_> = repos
            .participants
            .list_all()
            .await?
            .into_iter()
            .filter(|p| !scored.contains(&p.id))
            .collect();
        pending.sort_by_key(|p| {
            let order = p
                .group_id
                .and_then(|g| draw_orders.get(&g).copied())
                .unwrap_or(i32::MAX);
            (order, p.id)
        });

        let remaining = pending.len();
        Ok(NextParticipantResponse {
            judge_id,
            round_number,
            participant: pending.into_iter().next().map(Into::into),
            remaining,
        })
    }

    /// Count, mean, extremes and distribution of a round's scores
    pub async fn statistics(repos: &Repositories, round_number: i32) -> AppResult<ScoreStatistics> {
        let values: Vec<f64> = repos
            .scores
            .list_by_round(round_number)
            .await?
            .into_iter()
            .map(|s| s.score)
            .collect();

        Ok(ScoreStatistics {
            round_number,
            total_scores: values.len(),
            average_score: mean(&values).map(round_display),
            highest_score: values.iter().copied().reduce(f64::max),
            lowest_score: values.iter().copied().reduce(f64::min),
            score_distribution: score_distribution(&values),
        })
    }

    /// Remove a score row
    pub async fn delete_score(repos: &Repositories, id: i64) -> AppResult<i64> {
        if !repos.scores.delete(id).await? {
            return Err(AppError::ScoreNotFound(id));
        }

        tracing::info!(score_id = id, "Score deleted");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        db::repositories::{MockJudgeRepository, MockScoreRepository},
        models::{NewJudge, NewParticipant, ScoreAction},
        utils::now_utc,
    };

    fn score_row(id: i64, participant_id: i64, judge_id: i64, score: f64) -> Score {
        let now = now_utc();
        Score {
            id,
            participant_id,
            judge_id,
            round_number: 1,
            score,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seed(repos: &Repositories, participants: usize, judges: usize) -> (Vec<i64>, Vec<i64>) {
        let mut participant_ids = Vec::new();
        for i in 0..participants {
            let p = repos
                .participants
                .create(
                    &NewParticipant {
                        name: format!("P{i}"),
                        organization: "Org".to_string(),
                        phone: format!("1380000{i:04}"),
                        group_id: None,
                    },
                    &format!("QR{i:06}"),
                )
                .await
                .unwrap();
            participant_ids.push(p.id);
        }

        let mut judge_ids = Vec::new();
        for i in 0..judges {
            let j = repos
                .judges
                .create(&NewJudge {
                    name: format!("J{i}"),
                    organization: None,
                })
                .await
                .unwrap();
            judge_ids.push(j.id);
        }

        (participant_ids, judge_ids)
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[8.0, 9.0, 10.0]), Some(9.0));
    }

    #[test]
    fn test_rank_by_average_breaks_ties_by_id() {
        let scores = vec![
            score_row(1, 3, 1, 8.0),
            score_row(2, 3, 2, 9.0),
            score_row(3, 1, 1, 8.5),
            score_row(4, 2, 1, 9.5),
        ];

        let ranked = rank_by_average(&scores);
        let order: Vec<(usize, i64)> = ranked.iter().map(|r| (r.rank, r.participant_id)).collect();

        assert_eq!(order, vec![(1, 2), (2, 1), (3, 3)]);
        assert_eq!(ranked[2].score_count, 2);
    }

    #[test]
    fn test_score_distribution_buckets_whole_points() {
        let distribution = score_distribution(&[7.2, 7.9, 10.0, 0.0]);
        assert_eq!(distribution.get(&7), Some(&2));
        assert_eq!(distribution.get(&10), Some(&1));
        assert_eq!(distribution.get(&0), Some(&1));
    }

    #[tokio::test]
    async fn test_resubmission_updates_single_row() {
        let repos = Repositories::in_memory();
        let (p, j) = seed(&repos, 1, 1).await;

        let first = ScoreService::submit_score(&repos, p[0], j[0], 7.5, 1).await.unwrap();
        let second = ScoreService::submit_score(&repos, p[0], j[0], 9.0, 1).await.unwrap();

        assert_eq!(first.action, ScoreAction::Created);
        assert_eq!(second.action, ScoreAction::Updated);
        assert_eq!(repos.scores.count_by_round(1).await.unwrap(), 1);

        let average = ScoreService::average(&repos, p[0], 1).await.unwrap();
        assert_eq!(average.average_score, Some(9.0));
    }

    #[tokio::test]
    async fn test_out_of_range_score_creates_nothing() {
        let repos = Repositories::in_memory();
        let (p, j) = seed(&repos, 1, 1).await;

        let err = ScoreService::submit_score(&repos, p[0], j[0], 11.0, 1)
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "INVALID_SCORE_RANGE");
        assert_eq!(repos.scores.count_by_round(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_and_inactive_references() {
        let repos = Repositories::in_memory();
        let (p, j) = seed(&repos, 1, 1).await;

        let err = ScoreService::submit_score(&repos, 999, j[0], 5.0, 1).await.unwrap_err();
        assert_eq!(err.error_code(), "PARTICIPANT_NOT_FOUND");

        let err = ScoreService::submit_score(&repos, p[0], 999, 5.0, 1).await.unwrap_err();
        assert_eq!(err.error_code(), "JUDGE_NOT_FOUND");

        repos.judges.set_active(j[0], false).await.unwrap();
        let err = ScoreService::submit_score(&repos, p[0], j[0], 5.0, 1).await.unwrap_err();
        assert_eq!(err.error_code(), "JUDGE_INACTIVE");
    }

    #[tokio::test]
    async fn test_average_without_scores_is_none() {
        let repos = Repositories::in_memory();
        let (p, _) = seed(&repos, 1, 1).await;

        let average = ScoreService::average(&repos, p[0], 1).await.unwrap();
        assert_eq!(average.average_score, None);
        assert_eq!(average.score_count, 0);
    }

    #[tokio::test]
    async fn test_progress_counts_expected_scores() {
        let repos = Repositories::in_memory();
        let (p, j) = seed(&repos, 2, 2).await;
        ScoreService::submit_score(&repos, p[0], j[0], 8.0, 1).await.unwrap();

        let progress = ScoreService::progress(&repos, 1).await.unwrap();
        assert_eq!(progress.expected_scores, 4);
        assert_eq!(progress.submitted_scores, 1);
        assert_eq!(progress.completion, 0.25);
        assert_eq!(progress.completion_rate, 25.0);
        assert_eq!(progress.judge_progress[0].given_scores, 1);
    }

    #[tokio::test]
    async fn test_progress_with_nothing_expected() {
        let repos = Repositories::in_memory();
        let progress = ScoreService::progress(&repos, 1).await.unwrap();
        assert_eq!(progress.expected_scores, 0);
        assert_eq!(progress.completion, 0.0);
    }

    #[tokio::test]
    async fn test_next_participant_skips_scored() {
        let repos = Repositories::in_memory();
        let (p, j) = seed(&repos, 3, 1).await;
        ScoreService::submit_score(&repos, p[0], j[0], 6.0, 1).await.unwrap();

        let next = ScoreService::next_participant(&repos, j[0], 1).await.unwrap();
        assert_eq!(next.remaining, 2);
        assert_eq!(next.participant.map(|p| p.id), Some(p[1]));
    }

    #[tokio::test]
    async fn test_batch_submit_isolates_failures() {
        let repos = Repositories::in_memory();
        let (p, j) = seed(&repos, 2, 1).await;
        let item = |participant_id, score| SubmitScoreRequest {
            participant_id,
            judge_id: j[0],
            score,
            round_number: None,
        };

        let report = ScoreService::batch_submit(&repos, vec![item(p[0], 8.0), item(p[1], -1.0), item(p[1], 6.5)])
            .await
            .unwrap();

        assert_eq!(report.success_count, 2);
        assert_eq!(report.failed_indices(), vec![1]);
        assert_eq!(report.errors[0].error_code, "INVALID_SCORE_RANGE");
    }

    #[tokio::test]
    async fn test_judge_lookup_failure_is_not_a_domain_outcome() {
        let base = Repositories::in_memory();
        let (p, _) = seed(&base, 1, 0).await;

        let mut judges = MockJudgeRepository::new();
        judges
            .expect_find_by_id()
            .returning(|_| Err(AppError::Database("connection reset".to_string())));
        let mut scores = MockScoreRepository::new();
        scores.expect_upsert().never();

        let repos = Repositories {
            judges: Arc::new(judges),
            scores: Arc::new(scores),
            ..base
        };

        let err = ScoreService::submit_score(&repos, p[0], 1, 5.0, 1).await.unwrap_err();
        assert!(!err.is_domain());
    }

    #[tokio::test]
    async fn test_delete_unknown_score() {
        let repos = Repositories::in_memory();
        let err = ScoreService::delete_score(&repos, 42).await.unwrap_err();
        assert_eq!(err.error_code(), "SCORE_NOT_FOUND");
    }
}
