use sqlx::PgPool;

use crate::error::{Result, StorageError};
use crate::models::{NewRating, ParticipantStatus, Rating, RatingAggregate};

pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a rating and refresh the participant aggregate in one transaction.
    ///
    /// The participant row stays locked from the phase check until commit;
    /// ratings for one participant and the weekly transition serialize on it.
    pub async fn upsert(&self, rating: &NewRating) -> Result<(Rating, RatingAggregate)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT 1
            FROM weekly_contest_participants
            WHERE participant_id = $1 AND status = $2 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(rating.participant_id)
        .bind(ParticipantStatus::ThisWeek.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            StorageError::ConstraintViolation(format!(
                "Participant is no longer '{}'",
                ParticipantStatus::ThisWeek
            ))
        })?;

        let stored = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, participant_id, week_start, stars)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, participant_id, week_start)
            DO UPDATE SET stars = EXCLUDED.stars, updated_at = now()
            RETURNING rating_id, user_id, participant_id, week_start, stars, created_at, updated_at
            "#,
        )
        .bind(rating.user_id)
        .bind(rating.participant_id)
        .bind(rating.week_start)
        .bind(rating.stars)
        .fetch_one(&mut *tx)
        .await?;

        let aggregate = sqlx::query_as::<_, RatingAggregate>(
            r#"
            UPDATE weekly_contest_participants p
            SET average_rating = agg.average_rating,
                total_votes = agg.total_votes,
                updated_at = now()
            FROM (
                SELECT COALESCE(ROUND(AVG(stars)::numeric, 2), 0) AS average_rating,
                       COUNT(*)::int AS total_votes
                FROM ratings
                WHERE participant_id = $1
            ) agg
            WHERE p.participant_id = $1
            RETURNING p.average_rating, p.total_votes
            "#,
        )
        .bind(rating.participant_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((stored, aggregate))
    }
}
