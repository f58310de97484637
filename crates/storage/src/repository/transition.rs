use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::error::Result;
use crate::models::{
    Participant, ParticipantStatus, TransitionCounts, TransitionJob, TransitionOutcome,
};
use crate::services::{TransitionPlan, select_winner};

pub struct TransitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransitionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_job(&self, week_start: NaiveDate) -> Result<Option<TransitionJob>> {
        let job = sqlx::query_as::<_, TransitionJob>(
            r#"
            SELECT week_start, week_end, winner_id, counts, started_at, completed_at
            FROM weekly_transition_jobs
            WHERE week_start = $1
            "#,
        )
        .bind(week_start)
        .fetch_optional(self.pool)
        .await?;

        Ok(job)
    }

    pub async fn list_jobs(&self, limit: i64) -> Result<Vec<TransitionJob>> {
        let jobs = sqlx::query_as::<_, TransitionJob>(
            r#"
            SELECT week_start, week_end, winner_id, counts, started_at, completed_at
            FROM weekly_transition_jobs
            ORDER BY week_start DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(jobs)
    }

    /// Apply a weekly plan in a single transaction.
    ///
    /// Returns `None` without touching any participant when the week's
    /// marker already exists. Any failure rolls back the marker together
    /// with every status change.
    ///
    /// The outgoing `this week` rows are locked before the winner is chosen,
    /// so ratings committed after the plan was built still count and rows
    /// deleted since then cannot win.
    pub async fn apply(&self, plan: &TransitionPlan) -> Result<Option<TransitionOutcome>> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            INSERT INTO weekly_transition_jobs (week_start, week_end)
            VALUES ($1, $2)
            ON CONFLICT (week_start) DO NOTHING
            "#,
        )
        .bind(plan.week.start)
        .bind(plan.week.end)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let outgoing = sqlx::query_as::<_, Participant>(
            r#"
            SELECT participant_id, user_id, status, application_data, average_rating,
                   total_votes, contest_week_start, contest_week_end, is_winner,
                   status_history, created_at, updated_at, deleted_at
            FROM weekly_contest_participants
            WHERE status = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(ParticipantStatus::ThisWeek.as_str())
        .fetch_all(&mut *tx)
        .await?;
        let winner_id = select_winner(&outgoing).map(|p| p.participant_id);

        let mut counts = TransitionCounts::default();

        for step in plan.steps() {
            let week = plan.week_for(step.to);

            let moved = sqlx::query(
                r#"
                UPDATE weekly_contest_participants
                SET status = $2,
                    status_history = status_history || jsonb_build_array($3::jsonb),
                    contest_week_start = COALESCE($4, contest_week_start),
                    contest_week_end = COALESCE($5, contest_week_end),
                    updated_at = now()
                WHERE status = $1 AND deleted_at IS NULL
                "#,
            )
            .bind(step.from.as_str())
            .bind(step.to.as_str())
            .bind(Json(plan.status_change(step)))
            .bind(week.map(|w| w.start))
            .bind(week.map(|w| w.end))
            .execute(&mut *tx)
            .await?;

            counts.record(step.to, moved.rows_affected());
        }

        if let Some(winner_id) = winner_id {
            sqlx::query(
                r#"
                UPDATE weekly_contest_participants
                SET is_winner = TRUE, updated_at = now()
                WHERE participant_id = $1 AND status = $2 AND deleted_at IS NULL
                "#,
            )
            .bind(winner_id)
            .bind(ParticipantStatus::Past.as_str())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE weekly_transition_jobs
            SET winner_id = $2, counts = $3, completed_at = now()
            WHERE week_start = $1
            "#,
        )
        .bind(plan.week.start)
        .bind(winner_id)
        .bind(Json(counts))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(TransitionOutcome { winner_id, counts }))
    }
}
