use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{list_transition_jobs, preview_transition, run_transition};
use crate::middleware::auth::require_api_key;
use crate::state::AppState;

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_transition_jobs))
        .route("/run", post(run_transition))
        .route("/preview", get(preview_transition))
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
}
