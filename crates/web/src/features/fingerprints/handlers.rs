use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use storage::dto::fingerprint::{FingerprintResponse, FingerprintSignals, LinkedAccountsResponse};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/fingerprints",
    request_body = FingerprintSignals,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Device recorded for the caller", body = FingerprintResponse),
        (status = 400, description = "Malformed signals"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "fingerprints"
)]
pub async fn record_fingerprint(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<FingerprintSignals>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(signals) = payload?;
    signals.validate()?;

    let response = services::record_fingerprint(
        state.store.as_ref(),
        state.multi_account_threshold,
        &user,
        &signals,
    )
    .await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/fingerprints/{fingerprint_id}",
    params(
        ("fingerprint_id" = String, Path, description = "Hex SHA-256 device fingerprint")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Accounts seen on the device", body = LinkedAccountsResponse),
        (status = 400, description = "Malformed fingerprint id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Fingerprint never seen")
    ),
    tag = "admin"
)]
pub async fn linked_accounts(
    State(state): State<AppState>,
    user: AuthUser,
    Path(fingerprint_id): Path<String>,
) -> Result<Response, WebError> {
    let response =
        services::linked_accounts(state.store.as_ref(), &user, &fingerprint_id).await?;

    Ok(Json(response).into_response())
}
