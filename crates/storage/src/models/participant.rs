use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ParticipantStatus;
use crate::error::{Result, StorageError};

/// A contest entrant, one row of `weekly_contest_participants`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub participant_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub application_data: serde_json::Value,
    pub average_rating: Decimal,
    pub total_votes: i32,
    pub contest_week_start: Option<NaiveDate>,
    pub contest_week_end: Option<NaiveDate>,
    pub is_winner: bool,
    pub status_history: Json<Vec<StatusChange>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn status(&self) -> Result<ParticipantStatus> {
        self.status
            .parse()
            .map_err(|e: super::participant_status::UnknownStatus| {
                StorageError::InvalidData(e.to_string())
            })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// One entry of the append-only `status_history` log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusChange {
    pub from: ParticipantStatus,
    pub to: ParticipantStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<Uuid>,
    pub reason: Option<String>,
}

impl StatusChange {
    pub fn new(from: ParticipantStatus, to: ParticipantStatus, changed_at: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            changed_at,
            changed_by: None,
            reason: None,
        }
    }

    pub fn by(mut self, user_id: Uuid) -> Self {
        self.changed_by = Some(user_id);
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
