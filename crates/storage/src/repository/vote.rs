use sqlx::PgPool;

use crate::error::{Result, StorageError};
use crate::models::{NewVote, ParticipantStatus, Vote};

pub struct VoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VoteRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the vote, or overwrite the caller's existing vote for the same week.
    ///
    /// The participant row is share-locked while the vote is written, so a
    /// concurrent weekly transition cannot move it out of `this week` midway.
    pub async fn upsert(&self, vote: &NewVote) -> Result<Vote> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT 1
            FROM weekly_contest_participants
            WHERE participant_id = $1 AND status = $2 AND deleted_at IS NULL
            FOR SHARE
            "#,
        )
        .bind(vote.participant_id)
        .bind(ParticipantStatus::ThisWeek.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            StorageError::ConstraintViolation(format!(
                "Participant is no longer '{}'",
                ParticipantStatus::ThisWeek
            ))
        })?;

        let vote = sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO votes (user_id, participant_id, week_start, value)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, participant_id, week_start)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            RETURNING vote_id, user_id, participant_id, week_start, value, created_at, updated_at
            "#,
        )
        .bind(vote.user_id)
        .bind(vote.participant_id)
        .bind(vote.week_start)
        .bind(vote.value)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(vote)
    }
}
