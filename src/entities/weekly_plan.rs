//! Weekly plan entity - One plan per user per calendar week.

use super::StringList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weekly plan database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weekly_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// First day of the week, inclusive
    pub week_start_date: Date,
    /// Last day of the week, inclusive
    pub week_end_date: Date,
    #[sea_orm(column_type = "Json", nullable)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<StringList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between WeeklyPlan and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One plan has many items
    #[sea_orm(has_many = "super::weekly_plan_item::Entity")]
    Items,
}

impl Related<super::weekly_plan_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
