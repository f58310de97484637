use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A like/dislike cast by a user on a participant during one contest week.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vote {
    pub vote_id: Uuid,
    pub user_id: Uuid,
    pub participant_id: Uuid,
    pub week_start: NaiveDate,
    pub value: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert input, keyed by `(user_id, participant_id, week_start)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
    pub user_id: Uuid,
    pub participant_id: Uuid,
    pub week_start: NaiveDate,
    pub value: i16,
}
