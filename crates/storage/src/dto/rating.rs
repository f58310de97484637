use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Rating, RatingAggregate};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CastRatingRequest {
    pub participant_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Stars must be between 1 and 5"))]
    pub stars: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub rating: Rating,
    pub aggregate: RatingAggregate,
    pub week_label: String,
}
