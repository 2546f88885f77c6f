//! Task entity - Actionable unit with an A/B/C priority.
//!
//! A task may serve a goal, carry a due date and time estimates, and be flagged as one
//! of the day's Most Important Tasks (`is_mit`).

use crate::types::common::{Priority, TaskStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Task database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    /// Order inside the priority band, 1 to 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    pub status: TaskStatus,
    /// Most Important Task flag
    pub is_mit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTimeUtc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTimeUtc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Task and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each task may serve one goal
    #[sea_orm(
        belongs_to = "super::goal::Entity",
        from = "Column::GoalId",
        to = "super::goal::Column::Id",
        on_delete = "SetNull"
    )]
    Goal,
    /// A task can appear in several weekly plans
    #[sea_orm(has_many = "super::weekly_plan_item::Entity")]
    PlanItems,
}

impl Related<super::goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl Related<super::weekly_plan_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
