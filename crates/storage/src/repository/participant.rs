use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Participant, ParticipantStatus, StatusChange};

/// Repository for `weekly_contest_participants`. Soft-deleted rows are never returned.
pub struct ParticipantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParticipantRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List participants, optionally restricted to one status
    pub async fn list(
        &self,
        status: Option<ParticipantStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT participant_id, user_id, status, application_data, average_rating,
                   total_votes, contest_week_start, contest_week_end, is_winner,
                   status_history, created_at, updated_at, deleted_at
            FROM weekly_contest_participants
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR status = $1)
            ORDER BY created_at ASC, participant_id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn count(&self, status: Option<ParticipantStatus>) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM weekly_contest_participants
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR status = $1)
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            SELECT participant_id, user_id, status, application_data, average_rating,
                   total_votes, contest_week_start, contest_week_end, is_winner,
                   status_history, created_at, updated_at, deleted_at
            FROM weekly_contest_participants
            WHERE participant_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(participant)
    }

    /// Create a `pending` application
    pub async fn create(
        &self,
        user_id: Uuid,
        application_data: &serde_json::Value,
    ) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO weekly_contest_participants (user_id, status, application_data)
            VALUES ($1, $2, $3)
            RETURNING participant_id, user_id, status, application_data, average_rating,
                      total_votes, contest_week_start, contest_week_end, is_winner,
                      status_history, created_at, updated_at, deleted_at
            "#,
        )
        .bind(user_id)
        .bind(ParticipantStatus::Pending.as_str())
        .bind(application_data)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).on_unique_violation("An active application already exists")
        })?;

        Ok(participant)
    }

    /// Move a participant from `from` to `to` and append `change` to its history.
    ///
    /// The update only applies while the row is still in `from`; a concurrent
    /// change in between surfaces as a constraint violation.
    pub async fn change_status(
        &self,
        id: Uuid,
        from: ParticipantStatus,
        to: ParticipantStatus,
        change: &StatusChange,
    ) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE weekly_contest_participants
            SET status = $3,
                status_history = status_history || jsonb_build_array($4::jsonb),
                updated_at = now()
            WHERE participant_id = $1 AND status = $2 AND deleted_at IS NULL
            RETURNING participant_id, user_id, status, application_data, average_rating,
                      total_votes, contest_week_start, contest_week_end, is_winner,
                      status_history, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(Json(change))
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            StorageError::ConstraintViolation(format!("Participant is no longer '{}'", from))
        })?;

        Ok(participant)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE weekly_contest_participants
            SET deleted_at = now(), updated_at = now()
            WHERE participant_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
