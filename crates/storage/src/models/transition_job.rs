use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Number of rows moved by each step of one weekly run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TransitionCounts {
    pub moved_to_past: u64,
    pub moved_to_this_week: u64,
    pub moved_to_next_week_on_site: u64,
    pub moved_to_next_week: u64,
}

impl TransitionCounts {
    pub fn total(&self) -> u64 {
        self.moved_to_past
            + self.moved_to_this_week
            + self.moved_to_next_week_on_site
            + self.moved_to_next_week
    }
}

/// Idempotency marker for one contest week.
/// What one applied weekly run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Selected inside the run's transaction, from the rows it locked.
    pub winner_id: Option<Uuid>,
    pub counts: TransitionCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransitionJob {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub winner_id: Option<Uuid>,
    pub counts: Json<TransitionCounts>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
