//! Check-in repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use super::CheckinRepository;
use crate::{
    constants::checkin_actions,
    error::AppResult,
    models::{CheckinContext, CheckinLog, CheckinTransition, Participant},
};

/// PostgreSQL-backed attendance storage
#[derive(Clone)]
pub struct PgCheckinRepository {
    pool: PgPool,
}

impl PgCheckinRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn append_event(
    conn: &mut PgConnection,
    participant_id: i64,
    action: &str,
    at: DateTime<Utc>,
    context: &CheckinContext,
) -> AppResult<CheckinLog> {
    let event = sqlx::query_as::<_, CheckinLog>(
        r#"
        INSERT INTO checkin_logs (participant_id, action, occurred_at, source, note)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(participant_id)
    .bind(action)
    .bind(at)
    .bind(context.source.as_deref())
    .bind(context.note.as_deref())
    .fetch_one(conn)
    .await?;

    Ok(event)
}

#[async_trait]
impl CheckinRepository for PgCheckinRepository {
    async fn record_checkin(
        &self,
        participant_id: i64,
        action: &str,
        at: DateTime<Utc>,
        context: &CheckinContext,
    ) -> AppResult<Option<CheckinTransition>> {
        let mut tx = self.pool.begin().await?;

        let participant = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE participants
            SET is_checked_in = TRUE, checkin_time = $2, updated_at = NOW()
            WHERE id = $1 AND NOT is_checked_in
            RETURNING *
            "#,
        )
        .bind(participant_id)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(participant) = participant else {
            return Ok(None);
        };

        let event = append_event(&mut tx, participant_id, action, at, context).await?;
        tx.commit().await?;

        Ok(Some(CheckinTransition { participant, event }))
    }

    async fn record_cancellation(
        &self,
        participant_id: i64,
        at: DateTime<Utc>,
        context: &CheckinContext,
    ) -> AppResult<Option<CheckinTransition>> {
        let mut tx = self.pool.begin().await?;

        let participant = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE participants
            SET is_checked_in = FALSE, checkin_time = NULL, updated_at = NOW()
            WHERE id = $1 AND is_checked_in
            RETURNING *
            "#,
        )
        .bind(participant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(participant) = participant else {
            return Ok(None);
        };

        let event = append_event(&mut tx, participant_id, checkin_actions::CANCEL, at, context).await?;
        tx.commit().await?;

        Ok(Some(CheckinTransition { participant, event }))
    }

    async fn list_for_participant(&self, participant_id: i64) -> AppResult<Vec<CheckinLog>> {
        let events = sqlx::query_as::<_, CheckinLog>(
            r#"
            SELECT * FROM checkin_logs
            WHERE participant_id = $1
            ORDER BY occurred_at DESC, id DESC
            "#,
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn list_recent(&self, limit: i64) -> AppResult<Vec<CheckinLog>> {
        let events = sqlx::query_as::<_, CheckinLog>(
            r#"SELECT * FROM checkin_logs ORDER BY occurred_at DESC, id DESC LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
