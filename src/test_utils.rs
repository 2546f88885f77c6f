//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test rows with sensible defaults.

use crate::{
    core::{goal, profile, task},
    entities,
    errors::Result,
    types::{
        GoalType, Priority,
        auth::AuthUser,
        goals::CreateGoal,
        tasks::CreateTask,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a signed-in account with the given names in its metadata.
pub fn test_user(first_name: &str, last_name: &str) -> AuthUser {
    let mut metadata = Map::new();
    metadata.insert("first_name".into(), Value::from(first_name));
    metadata.insert("last_name".into(), Value::from(last_name));
    let now = Utc::now();
    AuthUser {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        email_confirmed_at: Some(now),
        phone: None,
        created_at: now,
        updated_at: now,
        last_sign_in_at: Some(now),
        app_metadata: Map::new(),
        user_metadata: metadata,
    }
}

/// Database plus a user whose profile already exists.
pub async fn setup_with_user() -> Result<(DatabaseConnection, Uuid)> {
    let db = setup_test_db().await?;
    let user = test_user("Test", "User");
    profile::ensure_profile(&db, &user).await?;
    Ok((db, user.id))
}

/// Creates a goal with no parent, description or target date.
pub async fn create_test_goal(
    db: &DatabaseConnection,
    user_id: Uuid,
    title: &str,
    goal_type: GoalType,
) -> Result<entities::goal::Model> {
    create_child_goal(db, user_id, title, goal_type, None).await
}

/// Creates a goal under `parent_goal_id`.
pub async fn create_child_goal(
    db: &DatabaseConnection,
    user_id: Uuid,
    title: &str,
    goal_type: GoalType,
    parent_goal_id: Option<Uuid>,
) -> Result<entities::goal::Model> {
    goal::create_goal(
        db,
        user_id,
        CreateGoal {
            title: title.to_string(),
            description: None,
            goal_type,
            parent_goal_id,
            target_date: None,
        },
    )
    .await
}

/// Creates a task with sensible defaults.
///
/// # Defaults
/// * no rank, goal, due date or estimate
/// * `is_mit`: false
pub async fn create_test_task(
    db: &DatabaseConnection,
    user_id: Uuid,
    title: &str,
    priority: Priority,
) -> Result<entities::task::Model> {
    create_custom_task(db, user_id, title, priority, None, None).await
}

/// Creates a task with a goal and/or due date.
pub async fn create_custom_task(
    db: &DatabaseConnection,
    user_id: Uuid,
    title: &str,
    priority: Priority,
    goal_id: Option<Uuid>,
    due_date: Option<DateTime<Utc>>,
) -> Result<entities::task::Model> {
    task::create_task(
        db,
        user_id,
        CreateTask {
            title: title.to_string(),
            description: None,
            priority,
            rank: None,
            is_mit: false,
            goal_id,
            due_date,
            estimated_minutes: None,
        },
    )
    .await
}
