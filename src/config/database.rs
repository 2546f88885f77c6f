//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the database schema always matches the Rust structs, and creation is idempotent.

use crate::entities::{Goal, Profile, Review, Task, WeeklyPlan, WeeklyPlanItem, weekly_plan};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use std::path::Path;
use tracing::{debug, info};

/// Unique index behind the one-plan-per-week rule.
pub const WEEKLY_PLAN_WEEK_INDEX: &str = "idx_weekly_plans_user_week";

/// Creates the parent directory of a file-backed `SQLite` URL.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() || file.contains(":memory:") {
        return Ok(());
    }
    if let Some(dir) = Path::new(file).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the containing directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    ensure_sqlite_dir(database_url)?;
    let db = Database::connect(database_url).await?;
    info!(backend = ?db.get_database_backend(), "Connected to database");
    Ok(db)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    debug!(table = entity.table_name(), "Ensured table exists");
    Ok(())
}

/// One weekly plan per user and week.
async fn create_week_index(db: &DatabaseConnection) -> Result<()> {
    let index = Index::create()
        .name(WEEKLY_PLAN_WEEK_INDEX)
        .table(WeeklyPlan)
        .col(weekly_plan::Column::UserId)
        .col(weekly_plan::Column::WeekStartDate)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(db.get_database_backend().build(&index)).await?;
    debug!(index = WEEKLY_PLAN_WEEK_INDEX, "Ensured index exists");
    Ok(())
}

/// Creates every table that does not exist yet, parents before children.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Profile).await?;
    create_table(db, &schema, Goal).await?;
    create_table(db, &schema, Task).await?;
    create_table(db, &schema, WeeklyPlan).await?;
    create_week_index(db).await?;
    create_table(db, &schema, WeeklyPlanItem).await?;
    create_table(db, &schema, Review).await?;

    Ok(())
}
