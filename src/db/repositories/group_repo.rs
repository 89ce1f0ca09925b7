//! Group repository

use async_trait::async_trait;
use sqlx::PgPool;

use super::GroupRepository;
use crate::{
    error::AppResult,
    models::{DrawAssignment, Group, GroupChanges, NewGroup},
};

/// PostgreSQL-backed group storage
#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create(&self, group: &NewGroup) -> AppResult<Group> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&group.name)
        .bind(group.description.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(r#"SELECT * FROM groups WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    async fn list(&self) -> AppResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"SELECT * FROM groups ORDER BY draw_order NULLS LAST, id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM groups"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, changes: &GroupChanges) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn replace_draw_orders(&self, assignments: &[DrawAssignment]) -> AppResult<()> {
        let group_ids: Vec<i64> = assignments.iter().map(|a| a.group_id).collect();
        let orders: Vec<i32> = assignments.iter().map(|a| a.draw_order).collect();

        let mut tx = self.pool.begin().await?;

        // Clear first: the partial unique index on draw_order is checked per row.
        sqlx::query(r#"UPDATE groups SET draw_order = NULL WHERE draw_order IS NOT NULL"#)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE groups AS g
            SET draw_order = v.draw_order, updated_at = NOW()
            FROM UNNEST($1::bigint[], $2::int[]) AS v(id, draw_order)
            WHERE g.id = v.id
            "#,
        )
        .bind(&group_ids)
        .bind(&orders)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"UPDATE participants SET group_id = NULL, updated_at = NOW() WHERE group_id = $1"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(r#"DELETE FROM groups WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
