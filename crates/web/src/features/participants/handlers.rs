use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    dto::participant::{
        ModerationRequest, ParticipantFilter, ParticipantResponse, SubmitApplicationRequest,
    },
    models::ParticipantStatus,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/participants",
    params(ParticipantFilter),
    responses(
        (status = 200, description = "Paginated list of live participants", body = storage::dto::common::PaginatedResponse<ParticipantResponse>),
        (status = 400, description = "Unknown status or invalid page window")
    ),
    tag = "participants"
)]
pub async fn list_participants(
    State(state): State<AppState>,
    Query(filter): Query<ParticipantFilter>,
) -> Result<Response, WebError> {
    let page = services::list_participants(state.store.as_ref(), &filter).await?;

    Ok(Json(page).into_response())
}

#[utoipa::path(
    get,
    path = "/api/participants/{id}",
    params(
        ("id" = Uuid, Path, description = "Participant ID")
    ),
    responses(
        (status = 200, description = "Participant found", body = ParticipantResponse),
        (status = 404, description = "Participant not found")
    ),
    tag = "participants"
)]
pub async fn get_participant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let participant = services::get_participant(state.store.as_ref(), id).await?;

    Ok(Json(ParticipantResponse::from(participant)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/participants",
    request_body = SubmitApplicationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Application submitted", body = ParticipantResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "An active application already exists")
    ),
    tag = "participants"
)]
pub async fn submit_application(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<SubmitApplicationRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let participant = services::submit_application(state.store.as_ref(), &user, &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ParticipantResponse::from(participant)),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/participants/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Participant ID")
    ),
    request_body = ModerationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Participant moved to 'pre next week'", body = ParticipantResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Participant not found"),
        (status = 409, description = "Participant is not pending")
    ),
    tag = "admin"
)]
pub async fn approve_participant(
    state: State<AppState>,
    user: AuthUser,
    path: Path<Uuid>,
    payload: Option<Json<ModerationRequest>>,
) -> Result<Response, WebError> {
    moderate(state, user, path, payload, ParticipantStatus::PreNextWeek).await
}

#[utoipa::path(
    post,
    path = "/api/participants/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Participant ID")
    ),
    request_body = ModerationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Participant rejected", body = ParticipantResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Participant not found"),
        (status = 409, description = "Participant is not pending")
    ),
    tag = "admin"
)]
pub async fn reject_participant(
    state: State<AppState>,
    user: AuthUser,
    path: Path<Uuid>,
    payload: Option<Json<ModerationRequest>>,
) -> Result<Response, WebError> {
    moderate(state, user, path, payload, ParticipantStatus::Rejected).await
}

async fn moderate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<ModerationRequest>>,
    target: ParticipantStatus,
) -> Result<Response, WebError> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    req.validate()?;

    let participant = services::moderate(
        state.store.as_ref(),
        &user,
        id,
        target,
        req.reason,
        Utc::now(),
    )
    .await?;

    Ok(Json(ParticipantResponse::from(participant)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/participants/{id}",
    params(
        ("id" = Uuid, Path, description = "Participant ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Participant soft-deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Participant not found")
    ),
    tag = "admin"
)]
pub async fn delete_participant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_participant(state.store.as_ref(), &user, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
