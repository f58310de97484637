use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::dto::vote::{CastVoteRequest, VoteResponse};

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/votes",
    request_body = CastVoteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Vote stored; a repeated vote in the same week replaces the previous one", body = VoteResponse),
        (status = 400, description = "Malformed payload or value other than 1 / -1"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participant not found"),
        (status = 409, description = "Participant is not in the 'this week' phase"),
        (status = 429, description = "Rate limit exceeded")
    ),
    tag = "voting"
)]
pub async fn cast_vote(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;

    let response = services::cast_vote(
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
