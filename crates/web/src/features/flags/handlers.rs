use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services::{self, FlagEvaluation, FlagsResponse, VariantAssignment};

#[utoipa::path(
    get,
    path = "/api/flags",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every feature flag evaluated for the caller", body = FlagsResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "flags"
)]
pub async fn list_flags(State(state): State<AppState>, user: AuthUser) -> Response {
    Json(services::evaluate_all(&state.flags, &user)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/flags/{key}",
    params(
        ("key" = String, Path, description = "Flag key")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Flag evaluated for the caller; unknown flags are disabled", body = FlagEvaluation),
        (status = 401, description = "Unauthorized")
    ),
    tag = "flags"
)]
pub async fn get_flag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
) -> Response {
    Json(services::evaluate(&state.flags, &key, &user)).into_response()
}

#[utoipa::path(
    post,
    path = "/api/experiments/{key}/assignment",
    params(
        ("key" = String, Path, description = "A/B test key")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Sticky variant for the caller", body = VariantAssignment),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown or disabled experiment")
    ),
    tag = "flags"
)]
pub async fn assign_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
) -> Result<Response, WebError> {
    let assignment =
        services::assign_variant(state.store.as_ref(), &state.flags, &key, &user).await?;

    Ok(Json(assignment).into_response())
}
