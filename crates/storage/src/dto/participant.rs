use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Participant, StatusChange};

/// Application form submitted by a user who wants to enter the contest
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitApplicationRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Full name must be between 1 and 120 characters"
    ))]
    pub full_name: String,

    #[validate(length(min = 1, max = 6, message = "Between 1 and 6 photos are required"))]
    #[validate(custom(function = "validate_photo_urls"))]
    pub photo_urls: Vec<String>,

    #[validate(range(min = 18, max = 99, message = "Age must be between 18 and 99"))]
    pub age: u8,

    #[validate(length(max = 120))]
    pub city: Option<String>,

    #[validate(length(max = 120))]
    pub country: Option<String>,

    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

impl SubmitApplicationRequest {
    /// Payload stored in `application_data`.
    pub fn application_data(&self) -> serde_json::Value {
        serde_json::json!({
            "full_name": self.full_name.trim(),
            "photo_urls": self.photo_urls,
            "age": self.age,
            "city": self.city,
            "country": self.country,
            "bio": self.bio,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ParticipantFilter {
    /// Contest phase, e.g. `this week` or `this_week`
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Optional note attached to a moderation decision
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ModerationRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub participant_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    #[schema(value_type = Object)]
    pub application_data: serde_json::Value,
    pub average_rating: Decimal,
    pub total_votes: i32,
    pub contest_week_start: Option<NaiveDate>,
    pub contest_week_end: Option<NaiveDate>,
    pub is_winner: bool,
    pub status_history: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            participant_id: p.participant_id,
            user_id: p.user_id,
            status: p.status,
            application_data: p.application_data,
            average_rating: p.average_rating,
            total_votes: p.total_votes,
            contest_week_start: p.contest_week_start,
            contest_week_end: p.contest_week_end,
            is_winner: p.is_winner,
            status_history: p.status_history.0,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

fn validate_photo_urls(urls: &[String]) -> Result<(), validator::ValidationError> {
    let all_https = urls
        .iter()
        .all(|url| url.starts_with("https://") && url.len() <= 2048);

    if all_https {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("invalid_photo_url");
        error.message = Some("Photo URLs must be https links".into());
        Err(error)
    }
}
