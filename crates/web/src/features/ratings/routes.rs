use axum::{Router, middleware, routing::post};

use super::handlers::cast_rating;
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(cast_rating))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}
