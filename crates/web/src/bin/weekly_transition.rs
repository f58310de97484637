use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use storage::{Database, services::WeekClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web::features::transitions::services;

#[derive(Parser)]
#[command(name = "weekly-transition")]
#[command(about = "Advance every contest participant by one weekly phase", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Offset of the contest's local time from UTC, in whole hours
    #[arg(long, env = "CONTEST_UTC_OFFSET_HOURS", default_value_t = 0, allow_hyphen_values = true)]
    utc_offset_hours: i32,

    /// Report what would move without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Run as if the current time were this RFC 3339 timestamp
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("weekly_transition={},web={},storage={}", log_level, log_level, log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let clock = WeekClock::from_utc_offset_hours(cli.utc_offset_hours)
        .context("--utc-offset-hours must be between -23 and 23")?;
    let now = cli.at.unwrap_or_else(Utc::now);

    let db = Database::new(&cli.database_url)
        .await
        .context("Failed to initialize database")?;
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    let summary = if cli.dry_run {
        services::preview_weekly_transition(&db, &clock, now).await?
    } else {
        services::run_weekly_transition(&db, &clock, now).await?
    };

    tracing::info!(
        week = %summary.week_label,
        status = ?summary.status,
        "Weekly transition finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
