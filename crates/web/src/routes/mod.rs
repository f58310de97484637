use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{fingerprints, flags, participants, ratings, transitions, votes};
use crate::openapi::ApiDoc;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/participants", participants::routes::routes(state.clone()))
        .nest("/votes", votes::routes::routes(state.clone()))
        .nest("/ratings", ratings::routes::routes(state.clone()))
        .nest("/flags", flags::routes::routes(state.clone()))
        .nest("/experiments", flags::routes::experiment_routes(state.clone()))
        .nest("/fingerprints", fingerprints::routes::routes(state.clone()))
        .nest(
            "/admin/transitions",
            transitions::routes::admin_routes(state.clone()),
        )
        .nest(
            "/admin/fingerprints",
            fingerprints::routes::admin_routes(state),
        )
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(state)
}
