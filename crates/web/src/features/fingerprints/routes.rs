use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{linked_accounts, record_fingerprint};
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(record_fingerprint))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:fingerprint_id", get(linked_accounts))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}
