//! Goal input, filter and progress shapes.

use super::common::{GoalType, SortDirection};
use super::database::{GoalInsert, GoalUpdate};
use crate::schema::{
    ObjectSchema, Shape, StringSchema, boolean, date_time, enumeration, integer, number, object,
    string, uuid,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) fn title() -> StringSchema {
    string()
        .min_with(1, "Title is required")
        .max_with(200, "Title must be less than 200 characters")
}

pub(crate) fn description() -> StringSchema {
    string().max_with(1000, "Description must be less than 1000 characters")
}

fn create_goal_schema() -> ObjectSchema {
    object()
        .field("title", title())
        .optional("description", description())
        .field("type", GoalType::schema())
        .optional("parent_goal_id", uuid())
        .optional("target_date", date_time())
}

/// User input for a new goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGoal {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
}

impl Shape for CreateGoal {
    fn schema() -> ObjectSchema {
        create_goal_schema()
    }
}

impl CreateGoal {
    #[must_use]
    pub fn into_insert(self, user_id: Uuid) -> GoalInsert {
        GoalInsert {
            user_id,
            title: self.title,
            description: self.description,
            goal_type: self.goal_type,
            parent_goal_id: self.parent_goal_id,
            target_date: self.target_date,
            is_completed: false,
            completed_at: None,
        }
    }
}

/// User input for editing a goal; every field may be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGoal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl Shape for UpdateGoal {
    fn schema() -> ObjectSchema {
        create_goal_schema()
            .partial()
            .optional("is_completed", boolean())
    }
}

impl UpdateGoal {
    /// Storage update stamped with `now`. `completed_at` is left to the caller,
    /// which knows the goal's previous completion state.
    #[must_use]
    pub fn into_update(self, now: DateTime<Utc>) -> GoalUpdate {
        GoalUpdate {
            title: self.title,
            description: self.description,
            goal_type: self.goal_type,
            parent_goal_id: self.parent_goal_id,
            target_date: self.target_date,
            is_completed: self.is_completed,
            ..GoalUpdate::touch(now)
        }
    }
}

/// Sparse predicates for listing goals. Absent members do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalFilters {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_target_date: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_goal_id: Option<Uuid>,
    /// Case-insensitive substring of title or description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Shape for GoalFilters {
    fn schema() -> ObjectSchema {
        object()
            .optional("type", GoalType::schema())
            .optional("is_completed", boolean())
            .optional("has_target_date", boolean())
            .optional("parent_goal_id", uuid())
            .optional("search", string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    TargetDate,
    Title,
}

impl GoalSortField {
    pub const VALUES: &'static [&'static str] = &["created_at", "updated_at", "target_date", "title"];
}

/// Sort order for goal listings, newest first by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSort {
    pub field: GoalSortField,
    pub direction: SortDirection,
}

impl Shape for GoalSort {
    fn schema() -> ObjectSchema {
        object()
            .with_default("field", enumeration(GoalSortField::VALUES), "created_at")
            .with_default("direction", enumeration(SortDirection::VALUES), "desc")
    }
}

/// Task-completion progress of a single goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    /// Whole percent, 0 to 100
    pub progress_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

impl Shape for GoalProgress {
    fn schema() -> ObjectSchema {
        object()
            .field("goal_id", uuid())
            .field("total_tasks", integer().min(0.0))
            .field("completed_tasks", integer().min(0.0))
            .field("progress_percentage", number().min(0.0).max(100.0))
            .optional("last_activity", date_time())
    }
}
