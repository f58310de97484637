use std::sync::Arc;

use anyhow::Context;
use storage::{Database, services::WeekClock};
use tokio::net::TcpListener;
use web::{
    config::Config,
    flags::FeatureFlags,
    middleware::auth::{ApiKeys, JwtVerifier},
    rate_limit::{RateLimitConfig, RateLimiter},
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting weekly contest API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let clock = WeekClock::from_utc_offset_hours(config.contest_utc_offset_hours)
        .context("CONTEST_UTC_OFFSET_HOURS must be between -23 and 23")?;

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let flags = FeatureFlags::load(config.feature_flags_path.as_deref())
        .context("Failed to load feature flags")?;

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty; admin transition endpoints will reject every caller");
    }

    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: config.rate_limit_max_requests,
        window: config.rate_limit_window,
    }));

    let sweeper = limiter.clone();
    let sweep_every = config.rate_limit_window;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            sweeper.purge_stale();
        }
    });

    let state = AppState {
        store: Arc::new(db),
        limiter,
        flags: Arc::new(flags),
        clock,
        api_keys,
        jwt: JwtVerifier::new(&config.jwt_secret, &config.jwt_audience),
        multi_account_threshold: config.multi_account_threshold,
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, routes::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
