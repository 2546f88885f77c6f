//! Review entity - Weekly or monthly reflection over a date range.

use super::StringList;
use crate::types::common::ReviewType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub period_start: Date,
    pub period_end: Date,
    #[sea_orm(column_type = "Json", nullable)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accomplishments: Option<StringList>,
    #[sea_orm(column_type = "Json", nullable)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<StringList>,
    #[sea_orm(column_type = "Json", nullable)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<StringList>,
    #[sea_orm(column_type = "Json", nullable)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_period_focus: Option<StringList>,
    /// 1 (poor) to 10 (excellent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Reviews are linked to other rows only through `user_id`
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
