use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{TransitionCounts, TransitionJob};
use crate::services::ContestWeek;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRunStatus {
    Completed,
    AlreadyCompleted,
    DryRun,
}

/// Result of one invocation of the weekly transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransitionSummary {
    pub status: TransitionRunStatus,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub week_label: String,
    pub winner_id: Option<Uuid>,
    #[serde(flatten)]
    pub counts: TransitionCounts,
}

impl TransitionSummary {
    pub fn new(
        status: TransitionRunStatus,
        week: ContestWeek,
        winner_id: Option<Uuid>,
        counts: TransitionCounts,
    ) -> Self {
        Self {
            status,
            week_start: week.start,
            week_end: week.end,
            week_label: week.label(),
            winner_id,
            counts,
        }
    }

    /// A repeated run for a week that was already processed.
    pub fn already_completed(week: ContestWeek, job: &TransitionJob) -> Self {
        Self::new(
            TransitionRunStatus::AlreadyCompleted,
            week,
            job.winner_id,
            TransitionCounts::default(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransitionJobResponse {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub winner_id: Option<Uuid>,
    pub counts: TransitionCounts,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<TransitionJob> for TransitionJobResponse {
    fn from(job: TransitionJob) -> Self {
        Self {
            week_start: job.week_start,
            week_end: job.week_end,
            winner_id: job.winner_id,
            counts: job.counts.0,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct TransitionJobFilter {
    #[serde(default = "default_job_limit")]
    pub limit: i64,
}

fn default_job_limit() -> i64 {
    20
}
