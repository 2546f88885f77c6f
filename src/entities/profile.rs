//! Profile entity - One row per authenticated user.
//!
//! Created lazily the first time a user signs in and edited from settings afterwards.
//! `user_id` is unique so the first-login bootstrap can insert without a prior read.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Identifier of the account in the external auth provider
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// IANA zone name, e.g. `America/New_York`
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Profiles are linked to other rows only through `user_id`
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
