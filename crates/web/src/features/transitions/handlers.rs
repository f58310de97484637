use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::dto::transition::{TransitionJobFilter, TransitionJobResponse, TransitionSummary};

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/admin/transitions/run",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Transition performed, or already completed for this week", body = TransitionSummary),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Transition failed; nothing was changed")
    ),
    tag = "admin"
)]
pub async fn run_transition(State(state): State<AppState>) -> Result<Response, WebError> {
    let summary =
        services::run_weekly_transition(state.store.as_ref(), &state.clock, Utc::now()).await?;

    Ok(Json(summary).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/transitions/preview",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Counts the next run would move", body = TransitionSummary),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin"
)]
pub async fn preview_transition(State(state): State<AppState>) -> Result<Response, WebError> {
    let summary =
        services::preview_weekly_transition(state.store.as_ref(), &state.clock, Utc::now())
            .await?;

    Ok(Json(summary).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/transitions",
    params(TransitionJobFilter),
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Most recent weekly runs", body = Vec<TransitionJobResponse>),
        (status = 400, description = "Invalid limit"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin"
)]
pub async fn list_transition_jobs(
    State(state): State<AppState>,
    Query(filter): Query<TransitionJobFilter>,
) -> Result<Response, WebError> {
    let jobs = services::list_jobs(state.store.as_ref(), filter.limit).await?;

    Ok(Json(jobs).into_response())
}
