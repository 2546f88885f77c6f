//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod goal;
pub mod profile;
pub mod review;
pub mod task;
pub mod weekly_plan;
pub mod weekly_plan_item;

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

// Re-export specific types to avoid conflicts
pub use goal::{Column as GoalColumn, Entity as Goal, Model as GoalModel};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use review::{Column as ReviewColumn, Entity as Review, Model as ReviewModel};
pub use task::{Column as TaskColumn, Entity as Task, Model as TaskModel};
pub use weekly_plan::{Column as WeeklyPlanColumn, Entity as WeeklyPlan, Model as WeeklyPlanModel};
pub use weekly_plan_item::{
    Column as WeeklyPlanItemColumn, Entity as WeeklyPlanItem, Model as WeeklyPlanItemModel,
};

/// Free-text entries stored as a JSON array column (focus areas, review answers).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl From<Vec<String>> for StringList {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl StringList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
