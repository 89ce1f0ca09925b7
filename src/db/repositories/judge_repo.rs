//! Judge repository

use async_trait::async_trait;
use sqlx::PgPool;

use super::JudgeRepository;
use crate::{
    error::AppResult,
    models::{Judge, NewJudge},
};

/// PostgreSQL-backed judge storage
#[derive(Clone)]
pub struct PgJudgeRepository {
    pool: PgPool,
}

impl PgJudgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JudgeRepository for PgJudgeRepository {
    async fn create(&self, judge: &NewJudge) -> AppResult<Judge> {
        let judge = sqlx::query_as::<_, Judge>(
            r#"
            INSERT INTO judges (name, organization)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&judge.name)
        .bind(judge.organization.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(judge)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Judge>> {
        let judge = sqlx::query_as::<_, Judge>(r#"SELECT * FROM judges WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(judge)
    }

    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Judge>> {
        let judges = sqlx::query_as::<_, Judge>(
            r#"SELECT * FROM judges WHERE $1 OR is_active ORDER BY id"#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(judges)
    }

    async fn set_active(&self, id: i64, is_active: bool) -> AppResult<Option<Judge>> {
        let judge = sqlx::query_as::<_, Judge>(
            r#"
            UPDATE judges
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(judge)
    }

    async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM judges WHERE is_active"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
