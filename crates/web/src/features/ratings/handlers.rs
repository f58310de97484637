use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::dto::rating::{CastRatingRequest, RatingResponse};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/ratings",
    request_body = CastRatingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rating stored and participant aggregate refreshed", body = RatingResponse),
        (status = 400, description = "Malformed payload or stars outside 1-5"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participant not found"),
        (status = 409, description = "Participant is not in the 'this week' phase"),
        (status = 429, description = "Rate limit exceeded")
    ),
    tag = "voting"
)]
pub async fn cast_rating(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CastRatingRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let response = services::cast_rating(
        state.store.as_ref(),
        &state.limiter,
        &state.clock,
        &user,
        &req,
        Utc::now(),
    )
    .await?;

    Ok(Json(response).into_response())
}
