use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{
    approve_participant, delete_participant, get_participant, list_participants,
    reject_participant, submit_application,
};
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(submit_application))
        .route("/:id", delete(delete_participant))
        .route("/:id/approve", post(approve_participant))
        .route("/:id/reject", post(reject_participant))
        .route_layer(middleware::from_fn_with_state(state, require_user));

    Router::new()
        .route("/", get(list_participants))
        .route("/:id", get(get_participant))
        .merge(protected)
}
