//! Goal entity - Hierarchical planning unit.
//!
//! Goals form a tree through `parent_goal_id`; the tier (`type`) says how far out the
//! goal looks. Deleting a parent detaches its children instead of removing them.

use crate::types::common::GoalType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Goal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tier: life, three-year, annual or quarterly
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTimeUtc>,
    pub is_completed: bool,
    /// Set when `is_completed` flips to true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Goal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each goal may sit under a broader goal
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentGoalId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Parent,
    /// One goal has many tasks
    #[sea_orm(has_many = "super::task::Entity")]
    Tasks,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
