use chrono::Utc;
use dotenvy::dotenv;
use lakein::{
    config::{database, settings},
    core::{
        profile,
        report::{self, format_progress_bar, format_tier_usage, format_week_range},
    },
    errors::{Error, Result},
    types::auth::AuthUser,
};
use serde_json::{Map, Value};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Account to bootstrap from `LAKEIN_USER_ID` and the optional name variables.
fn user_from_env() -> Result<Option<AuthUser>> {
    let Ok(raw_id) = env::var("LAKEIN_USER_ID") else {
        return Ok(None);
    };
    let id = Uuid::parse_str(raw_id.trim()).map_err(|e| Error::Config {
        message: format!("LAKEIN_USER_ID is not a UUID: {e}"),
    })?;

    let mut metadata = Map::new();
    for (key, var) in [
        ("first_name", "LAKEIN_FIRST_NAME"),
        ("last_name", "LAKEIN_LAST_NAME"),
        ("timezone", "LAKEIN_TIMEZONE"),
    ] {
        if let Ok(value) = env::var(var) {
            metadata.insert(key.to_string(), Value::from(value));
        }
    }

    let now = Utc::now();
    Ok(Some(AuthUser {
        id,
        email: env::var("LAKEIN_USER_EMAIL").unwrap_or_default(),
        email_confirmed_at: None,
        phone: None,
        created_at: now,
        updated_at: now,
        last_sign_in_at: Some(now),
        app_metadata: Map::new(),
        user_metadata: metadata,
    }))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Load .env file before anything reads the environment
    dotenv().ok();

    // 2. Load settings, then start tracing with RUST_LOG taking precedence
    let settings = settings::load_default_settings()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter)),
        )
        .init();

    // 3. Connect and make sure every table exists
    let db = database::create_connection(&settings.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database tables ready"))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Optionally bootstrap one user and report their dashboard
    let Some(user) = user_from_env()? else {
        info!("LAKEIN_USER_ID not set, nothing else to do");
        return Ok(());
    };

    let profile = profile::ensure_profile(&db, &user).await?;
    let today = Utc::now().date_naive();
    let summary = report::dashboard_summary(&db, user.id, today).await?;
    let name = format!("{} {}", profile.first_name, profile.last_name);
    let mits = format!("{}/{}", summary.mit_count, summary.mit_limit);

    info!(
        user_id = %profile.user_id,
        name = name.trim(),
        week = %format_week_range(summary.week_start, summary.week_end),
        life = %format_tier_usage(&summary.life_goals),
        annual = %format_tier_usage(&summary.annual_goals),
        planned = summary.planned_items.len(),
        plan = %format_progress_bar(summary.plan_progress(), 10),
        mits = %mits,
        open_tasks = summary.open_tasks,
        "Dashboard summary"
    );

    Ok(())
}
