use std::sync::Arc;

use axum::extract::FromRef;
use storage::{ContestStore, services::WeekClock};

use crate::flags::FeatureFlags;
use crate::middleware::auth::{ApiKeys, JwtVerifier};
use crate::rate_limit::RateLimiter;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContestStore>,
    pub limiter: Arc<RateLimiter>,
    pub flags: Arc<FeatureFlags>,
    pub clock: WeekClock,
    pub api_keys: ApiKeys,
    pub jwt: JwtVerifier,
    pub multi_account_threshold: usize,
}

impl FromRef<AppState> for ApiKeys {
    fn from_ref(state: &AppState) -> Self {
        state.api_keys.clone()
    }
}

impl FromRef<AppState> for JwtVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
