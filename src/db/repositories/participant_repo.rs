//! Participant repository

use async_trait::async_trait;
use sqlx::PgPool;

use super::ParticipantRepository;
use crate::{
    error::AppResult,
    models::{NewParticipant, Participant, ParticipantChanges},
};

/// PostgreSQL-backed participant storage
#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    async fn create(&self, participant: &NewParticipant, qr_code_id: &str) -> AppResult<Participant> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (name, organization, phone, phone_last4, group_id, qr_code_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&participant.name)
        .bind(&participant.organization)
        .bind(&participant.phone)
        .bind(participant.phone_last4())
        .bind(participant.group_id)
        .bind(qr_code_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(participant)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>> {
        let participant =
            sqlx::query_as::<_, Participant>(r#"SELECT * FROM participants WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(participant)
    }

    async fn find_by_qr_code(&self, qr_code_id: &str) -> AppResult<Option<Participant>> {
        let participant =
            sqlx::query_as::<_, Participant>(r#"SELECT * FROM participants WHERE qr_code_id = $1"#)
                .bind(qr_code_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(participant)
    }

    async fn qr_code_exists(&self, qr_code_id: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM participants WHERE qr_code_id = $1)"#,
        )
        .bind(qr_code_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list(
        &self,
        offset: i64,
        limit: i64,
        search: Option<String>,
    ) -> AppResult<(Vec<Participant>, i64)> {
        let search_pattern = search.map(|s| format!("%{}%", s));

        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT * FROM participants
            WHERE
                $1::text IS NULL
                OR name ILIKE $1
                OR organization ILIKE $1
                OR phone ILIKE $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(&search_pattern)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM participants
            WHERE
                $1::text IS NULL
                OR name ILIKE $1
                OR organization ILIKE $1
                OR phone ILIKE $1
            "#,
        )
        .bind(&search_pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((participants, count))
    }

    async fn list_all(&self) -> AppResult<Vec<Participant>> {
        let participants =
            sqlx::query_as::<_, Participant>(r#"SELECT * FROM participants ORDER BY id"#)
                .fetch_all(&self.pool)
                .await?;

        Ok(participants)
    }

    async fn list_ungrouped(&self) -> AppResult<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"SELECT * FROM participants WHERE group_id IS NULL ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    async fn list_by_organization(&self, organization: &str) -> AppResult<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"SELECT * FROM participants WHERE organization = $1 ORDER BY id"#,
        )
        .bind(organization)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    async fn list_by_group(&self, group_id: i64) -> AppResult<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"SELECT * FROM participants WHERE group_id = $1 ORDER BY id"#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM participants"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, changes: &ParticipantChanges) -> AppResult<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE participants
            SET
                name = COALESCE($2, name),
                organization = COALESCE($3, organization),
                phone = COALESCE($4, phone),
                phone_last4 = COALESCE($5, phone_last4),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.organization.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.phone_last4())
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    async fn set_group(&self, id: i64, group_id: Option<i64>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE participants SET group_id = $2, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .bind(group_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign_group(&self, ids: &[i64], group_id: i64) -> AppResult<u64> {
        let result = sqlx::query(
            r#"UPDATE participants SET group_id = $2, updated_at = NOW() WHERE id = ANY($1)"#,
        )
        .bind(ids)
        .bind(group_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
