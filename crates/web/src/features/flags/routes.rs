use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{assign_variant, get_flag, list_flags};
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_flags))
        .route("/:key", get(get_flag))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

pub fn experiment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:key/assignment", post(assign_variant))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}
