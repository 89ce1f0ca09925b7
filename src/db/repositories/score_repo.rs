//! Score repository

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::ScoreRepository;
use crate::{
    error::AppResult,
    models::{Score, ScoreAction, ScoreKey},
};

/// PostgreSQL-backed score ledger
#[derive(Clone)]
pub struct PgScoreRepository {
    pool: PgPool,
}

impl PgScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Upsert result row; `xmax = 0` holds only for freshly inserted tuples
#[derive(FromRow)]
struct UpsertedScore {
    #[sqlx(flatten)]
    score: Score,
    inserted: bool,
}

#[async_trait]
impl ScoreRepository for PgScoreRepository {
    async fn find_by_key(&self, key: ScoreKey) -> AppResult<Option<Score>> {
        let score = sqlx::query_as::<_, Score>(
            r#"
            SELECT * FROM scores
            WHERE participant_id = $1 AND judge_id = $2 AND round_number = $3
            "#,
        )
        .bind(key.participant_id)
        .bind(key.judge_id)
        .bind(key.round_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(score)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Score>> {
        let score = sqlx::query_as::<_, Score>(r#"SELECT * FROM scores WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(score)
    }

    async fn upsert(&self, key: ScoreKey, score: f64) -> AppResult<(Score, ScoreAction)> {
        let row = sqlx::query_as::<_, UpsertedScore>(
            r#"
            INSERT INTO scores (participant_id, judge_id, round_number, score)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (participant_id, judge_id, round_number)
            DO UPDATE SET score = EXCLUDED.score, updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(key.participant_id)
        .bind(key.judge_id)
        .bind(key.round_number)
        .bind(score)
        .fetch_one(&self.pool)
        .await?;

        let action = if row.inserted {
            ScoreAction::Created
        } else {
            ScoreAction::Updated
        };

        Ok((row.score, action))
    }

    async fn list_by_participant(&self, participant_id: i64, round_number: i32) -> AppResult<Vec<Score>> {
        let scores = sqlx::query_as::<_, Score>(
            r#"
            SELECT * FROM scores
            WHERE participant_id = $1 AND round_number = $2
            ORDER BY judge_id
            "#,
        )
        .bind(participant_id)
        .bind(round_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(scores)
    }

    async fn list_by_judge(&self, judge_id: i64, round_number: i32) -> AppResult<Vec<Score>> {
        let scores = sqlx::query_as::<_, Score>(
            r#"
            SELECT * FROM scores
            WHERE judge_id = $1 AND round_number = $2
            ORDER BY participant_id
            "#,
        )
        .bind(judge_id)
        .bind(round_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(scores)
    }

    async fn list_by_round(&self, round_number: i32) -> AppResult<Vec<Score>> {
        let scores = sqlx::query_as::<_, Score>(
            r#"SELECT * FROM scores WHERE round_number = $1 ORDER BY id"#,
        )
        .bind(round_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(scores)
    }

    async fn count_by_round(&self, round_number: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM scores WHERE round_number = $1"#)
                .bind(round_number)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM scores WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
