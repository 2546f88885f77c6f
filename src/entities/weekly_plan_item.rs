//! Weekly plan item entity - Links a task into a weekly plan.
//!
//! The item keeps its own priority, rank and MIT flag, so a task can be planned for the
//! week at a different priority than its general one.

use crate::types::common::Priority;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weekly plan item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weekly_plan_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub weekly_plan_id: Uuid,
    pub task_id: Uuid,
    /// Priority for this week, independent of the task's own
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    pub is_mit: bool,
    pub created_at: DateTimeUtc,
}

/// Defines relationships between WeeklyPlanItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::weekly_plan::Entity",
        from = "Column::WeeklyPlanId",
        to = "super::weekly_plan::Column::Id",
        on_delete = "Cascade"
    )]
    WeeklyPlan,
    #[sea_orm(
        belongs_to = "super::task::Entity",
        from = "Column::TaskId",
        to = "super::task::Column::Id",
        on_delete = "Cascade"
    )]
    Task,
}

impl Related<super::weekly_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeeklyPlan.def()
    }
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
