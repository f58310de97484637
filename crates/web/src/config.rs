use std::time::Duration;

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window: Duration,
    pub contest_utc_offset_hours: i32,
    pub feature_flags_path: Option<String>,
    pub multi_account_threshold: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret =
            std::env::var("JWT_SECRET").context("Cannot load JWT_SECRET env variable")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 bytes");
        }

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            jwt_secret,
            jwt_audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "authenticated".to_string()),
            rate_limit_max_requests: parse_or("RATE_LIMIT_MAX_REQUESTS", 10)?,
            rate_limit_window: Duration::from_millis(parse_or("RATE_LIMIT_WINDOW_MS", 60_000)?),
            contest_utc_offset_hours: parse_or("CONTEST_UTC_OFFSET_HOURS", 0)?,
            feature_flags_path: std::env::var("FEATURE_FLAGS_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            multi_account_threshold: parse_or("MULTI_ACCOUNT_THRESHOLD", 3)?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}
