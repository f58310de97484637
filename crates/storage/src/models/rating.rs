use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rating {
    pub rating_id: Uuid,
    pub user_id: Uuid,
    pub participant_id: Uuid,
    pub week_start: NaiveDate,
    pub stars: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    pub user_id: Uuid,
    pub participant_id: Uuid,
    pub week_start: NaiveDate,
    pub stars: i16,
}

/// Participant aggregate recomputed after every rating upsert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RatingAggregate {
    pub average_rating: Decimal,
    pub total_votes: i32,
}

impl RatingAggregate {
    /// Mean of `stars` rounded to two decimals, as stored in `average_rating`.
    pub fn from_stars(stars: &[i16]) -> Self {
        if stars.is_empty() {
            return Self {
                average_rating: Decimal::ZERO,
                total_votes: 0,
            };
        }

        let sum: i64 = stars.iter().map(|s| i64::from(*s)).sum();
        let average = Decimal::from(sum) / Decimal::from(stars.len() as i64);

        Self {
            average_rating: average.round_dp(2),
            total_votes: stars.len() as i32,
        }
    }
}
