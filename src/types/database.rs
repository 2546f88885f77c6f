//! Row shapes for every table, with their insert and update companions.
//!
//! The SeaORM `Model` of each entity is the persisted row shape and is validated by the
//! row schema defined here. Insert shapes drop the server-assigned id and timestamps;
//! update shapes make every mutable column optional and require a fresh `updated_at`
//! from the caller.

use super::common::{DEFAULT_TIMEZONE, GoalType, Priority, ReviewType, TaskStatus};
use crate::entities::{StringList, goal, profile, review, task, weekly_plan, weekly_plan_item};
use crate::schema::{
    ObjectSchema, Shape, array, boolean, date, date_time, int32, integer, object, string, url,
    uuid,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Backing tables, in foreign-key creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Goals,
    Tasks,
    WeeklyPlans,
    WeeklyPlanItems,
    Reviews,
}

impl Table {
    pub const ALL: [Self; 6] = [
        Self::Profiles,
        Self::Goals,
        Self::Tasks,
        Self::WeeklyPlans,
        Self::WeeklyPlanItems,
        Self::Reviews,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Goals => "goals",
            Self::Tasks => "tasks",
            Self::WeeklyPlans => "weekly_plans",
            Self::WeeklyPlanItems => "weekly_plan_items",
            Self::Reviews => "reviews",
        }
    }
}

const SERVER_FIELDS: &[&str] = &["id", "created_at", "updated_at"];
const IMMUTABLE_FIELDS: &[&str] = &["id", "user_id", "created_at"];

/// Insert shape of a row schema: server-assigned fields removed.
fn insert_of(row: ObjectSchema) -> ObjectSchema {
    row.omit(SERVER_FIELDS)
}

/// Update shape of a row schema: mutable fields optional, `updated_at` mandatory.
fn update_of(row: ObjectSchema) -> ObjectSchema {
    row.omit(IMMUTABLE_FIELDS)
        .partial()
        .field("updated_at", date_time())
}

fn text_list() -> crate::schema::ArraySchema {
    array(string())
}

// ---------------------------------------------------------------------------
// profiles
// ---------------------------------------------------------------------------

fn profile_row() -> ObjectSchema {
    object()
        .field("id", uuid())
        .field("user_id", uuid())
        .field("first_name", string())
        .field("last_name", string())
        .with_default("timezone", string(), DEFAULT_TIMEZONE)
        .optional("avatar_url", url())
        .field("created_at", date_time())
        .field("updated_at", date_time())
}

impl Shape for profile::Model {
    fn schema() -> ObjectSchema {
        profile_row()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInsert {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Shape for ProfileInsert {
    fn schema() -> ObjectSchema {
        insert_of(profile_row())
    }
}

impl ProfileInsert {
    #[must_use]
    pub fn into_active_model(self, now: DateTime<Utc>) -> profile::ActiveModel {
        profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(self.user_id),
            first_name: Set(self.first_name),
            last_name: Set(self.last_name),
            timezone: Set(self.timezone),
            avatar_url: Set(self.avatar_url),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Shape for ProfileUpdate {
    fn schema() -> ObjectSchema {
        update_of(profile_row())
    }
}

impl ProfileUpdate {
    pub fn apply_to(self, active: &mut profile::ActiveModel) {
        if let Some(first_name) = self.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = self.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(timezone) = self.timezone {
            active.timezone = Set(timezone);
        }
        if let Some(avatar_url) = self.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        active.updated_at = Set(self.updated_at);
    }
}

// ---------------------------------------------------------------------------
// goals
// ---------------------------------------------------------------------------

fn goal_row() -> ObjectSchema {
    object()
        .field("id", uuid())
        .field("user_id", uuid())
        .field("title", string().min_with(1, "Title is required"))
        .optional("description", string())
        .field("type", GoalType::schema())
        .optional("parent_goal_id", uuid())
        .optional("target_date", date_time())
        .with_default("is_completed", boolean(), false)
        .optional("completed_at", date_time())
        .field("created_at", date_time())
        .field("updated_at", date_time())
}

impl Shape for goal::Model {
    fn schema() -> ObjectSchema {
        goal_row()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalInsert {
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Shape for GoalInsert {
    fn schema() -> ObjectSchema {
        insert_of(goal_row())
    }
}

impl GoalInsert {
    #[must_use]
    pub fn into_active_model(self, now: DateTime<Utc>) -> goal::ActiveModel {
        goal::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(self.user_id),
            title: Set(self.title),
            description: Set(self.description),
            goal_type: Set(self.goal_type),
            parent_goal_id: Set(self.parent_goal_id),
            target_date: Set(self.target_date),
            is_completed: Set(self.is_completed),
            completed_at: Set(self.completed_at),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalUpdate {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Shape for GoalUpdate {
    fn schema() -> ObjectSchema {
        update_of(goal_row())
    }
}

impl GoalUpdate {
    /// An update that only refreshes the timestamp.
    #[must_use]
    pub const fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            goal_type: None,
            parent_goal_id: None,
            target_date: None,
            is_completed: None,
            completed_at: None,
            updated_at,
        }
    }

    pub fn apply_to(self, active: &mut goal::ActiveModel) {
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        if let Some(goal_type) = self.goal_type {
            active.goal_type = Set(goal_type);
        }
        if let Some(parent_goal_id) = self.parent_goal_id {
            active.parent_goal_id = Set(Some(parent_goal_id));
        }
        if let Some(target_date) = self.target_date {
            active.target_date = Set(Some(target_date));
        }
        if let Some(is_completed) = self.is_completed {
            active.is_completed = Set(is_completed);
        }
        if let Some(completed_at) = self.completed_at {
            active.completed_at = Set(Some(completed_at));
        }
        active.updated_at = Set(self.updated_at);
    }
}

// ---------------------------------------------------------------------------
// tasks
// ---------------------------------------------------------------------------

fn task_row() -> ObjectSchema {
    object()
        .field("id", uuid())
        .field("user_id", uuid())
        .field("title", string().min_with(1, "Title is required"))
        .optional("description", string())
        .field("priority", Priority::schema())
        .optional("rank", integer().min(1.0).max(5.0))
        .with_default("status", TaskStatus::schema(), TaskStatus::Pending.as_str())
        .with_default("is_mit", boolean(), false)
        .optional("goal_id", uuid())
        .optional("due_date", date_time())
        .optional("completed_at", date_time())
        .optional("estimated_minutes", int32().positive())
        .optional("actual_minutes", int32().positive())
        .field("created_at", date_time())
        .field("updated_at", date_time())
}

impl Shape for task::Model {
    fn schema() -> ObjectSchema {
        task_row()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInsert {
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    pub status: TaskStatus,
    pub is_mit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<i32>,
}

impl Shape for TaskInsert {
    fn schema() -> ObjectSchema {
        insert_of(task_row())
    }
}

impl TaskInsert {
    #[must_use]
    pub fn into_active_model(self, now: DateTime<Utc>) -> task::ActiveModel {
        task::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(self.user_id),
            title: Set(self.title),
            description: Set(self.description),
            priority: Set(self.priority),
            rank: Set(self.rank),
            status: Set(self.status),
            is_mit: Set(self.is_mit),
            goal_id: Set(self.goal_id),
            due_date: Set(self.due_date),
            completed_at: Set(self.completed_at),
            estimated_minutes: Set(self.estimated_minutes),
            actual_minutes: Set(self.actual_minutes),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl Shape for TaskUpdate {
    fn schema() -> ObjectSchema {
        update_of(task_row())
    }
}

impl TaskUpdate {
    #[must_use]
    pub const fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            priority: None,
            rank: None,
            status: None,
            is_mit: None,
            goal_id: None,
            due_date: None,
            completed_at: None,
            estimated_minutes: None,
            actual_minutes: None,
            updated_at,
        }
    }

    pub fn apply_to(self, active: &mut task::ActiveModel) {
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        if let Some(priority) = self.priority {
            active.priority = Set(priority);
        }
        if let Some(rank) = self.rank {
            active.rank = Set(Some(rank));
        }
        if let Some(status) = self.status {
            active.status = Set(status);
        }
        if let Some(is_mit) = self.is_mit {
            active.is_mit = Set(is_mit);
        }
        if let Some(goal_id) = self.goal_id {
            active.goal_id = Set(Some(goal_id));
        }
        if let Some(due_date) = self.due_date {
            active.due_date = Set(Some(due_date));
        }
        if let Some(completed_at) = self.completed_at {
            active.completed_at = Set(Some(completed_at));
        }
        if let Some(estimated_minutes) = self.estimated_minutes {
            active.estimated_minutes = Set(Some(estimated_minutes));
        }
        if let Some(actual_minutes) = self.actual_minutes {
            active.actual_minutes = Set(Some(actual_minutes));
        }
        active.updated_at = Set(self.updated_at);
    }
}

// ---------------------------------------------------------------------------
// weekly_plans
// ---------------------------------------------------------------------------

fn weekly_plan_row() -> ObjectSchema {
    object()
        .field("id", uuid())
        .field("user_id", uuid())
        .field("week_start_date", date())
        .field("week_end_date", date())
        .optional("focus_areas", text_list())
        .optional("notes", string())
        .field("created_at", date_time())
        .field("updated_at", date_time())
}

impl Shape for weekly_plan::Model {
    fn schema() -> ObjectSchema {
        weekly_plan_row()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPlanInsert {
    pub user_id: Uuid,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Shape for WeeklyPlanInsert {
    fn schema() -> ObjectSchema {
        insert_of(weekly_plan_row())
    }
}

impl WeeklyPlanInsert {
    #[must_use]
    pub fn into_active_model(self, now: DateTime<Utc>) -> weekly_plan::ActiveModel {
        weekly_plan::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(self.user_id),
            week_start_date: Set(self.week_start_date),
            week_end_date: Set(self.week_end_date),
            focus_areas: Set(self.focus_areas.map(StringList::from)),
            notes: Set(self.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPlanUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Shape for WeeklyPlanUpdate {
    fn schema() -> ObjectSchema {
        update_of(weekly_plan_row())
    }
}

impl WeeklyPlanUpdate {
    pub fn apply_to(self, active: &mut weekly_plan::ActiveModel) {
        if let Some(start) = self.week_start_date {
            active.week_start_date = Set(start);
        }
        if let Some(end) = self.week_end_date {
            active.week_end_date = Set(end);
        }
        if let Some(focus_areas) = self.focus_areas {
            active.focus_areas = Set(Some(StringList(focus_areas)));
        }
        if let Some(notes) = self.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(self.updated_at);
    }
}

// ---------------------------------------------------------------------------
// weekly_plan_items
// ---------------------------------------------------------------------------

fn weekly_plan_item_row() -> ObjectSchema {
    object()
        .field("id", uuid())
        .field("weekly_plan_id", uuid())
        .field("task_id", uuid())
        .field("priority", Priority::schema())
        .optional("rank", integer().min(1.0).max(5.0))
        .with_default("is_mit", boolean(), false)
        .field("created_at", date_time())
}

impl Shape for weekly_plan_item::Model {
    fn schema() -> ObjectSchema {
        weekly_plan_item_row()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPlanItemInsert {
    pub weekly_plan_id: Uuid,
    pub task_id: Uuid,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    pub is_mit: bool,
}

impl Shape for WeeklyPlanItemInsert {
    fn schema() -> ObjectSchema {
        weekly_plan_item_row().omit(&["id", "created_at"])
    }
}

impl WeeklyPlanItemInsert {
    #[must_use]
    pub fn into_active_model(self, now: DateTime<Utc>) -> weekly_plan_item::ActiveModel {
        weekly_plan_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            weekly_plan_id: Set(self.weekly_plan_id),
            task_id: Set(self.task_id),
            priority: Set(self.priority),
            rank: Set(self.rank),
            is_mit: Set(self.is_mit),
            created_at: Set(now),
        }
    }
}

/// Plan items carry no `updated_at`, so their update shape has no mandatory field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPlanItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mit: Option<bool>,
}

impl Shape for WeeklyPlanItemUpdate {
    fn schema() -> ObjectSchema {
        weekly_plan_item_row()
            .omit(&["id", "weekly_plan_id", "task_id", "created_at"])
            .partial()
    }
}

impl WeeklyPlanItemUpdate {
    pub fn apply_to(self, active: &mut weekly_plan_item::ActiveModel) {
        if let Some(priority) = self.priority {
            active.priority = Set(priority);
        }
        if let Some(rank) = self.rank {
            active.rank = Set(Some(rank));
        }
        if let Some(is_mit) = self.is_mit {
            active.is_mit = Set(is_mit);
        }
    }
}

// ---------------------------------------------------------------------------
// reviews
// ---------------------------------------------------------------------------

fn review_row() -> ObjectSchema {
    object()
        .field("id", uuid())
        .field("user_id", uuid())
        .field("type", ReviewType::schema())
        .field("period_start", date())
        .field("period_end", date())
        .optional("accomplishments", text_list())
        .optional("challenges", text_list())
        .optional("lessons_learned", text_list())
        .optional("next_period_focus", text_list())
        .optional("satisfaction_score", integer().min(1.0).max(10.0))
        .optional("notes", string())
        .field("created_at", date_time())
        .field("updated_at", date_time())
}

impl Shape for review::Model {
    fn schema() -> ObjectSchema {
        review_row()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInsert {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accomplishments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_period_focus: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Shape for ReviewInsert {
    fn schema() -> ObjectSchema {
        insert_of(review_row())
    }
}

impl ReviewInsert {
    #[must_use]
    pub fn into_active_model(self, now: DateTime<Utc>) -> review::ActiveModel {
        review::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(self.user_id),
            review_type: Set(self.review_type),
            period_start: Set(self.period_start),
            period_end: Set(self.period_end),
            accomplishments: Set(self.accomplishments.map(StringList::from)),
            challenges: Set(self.challenges.map(StringList::from)),
            lessons_learned: Set(self.lessons_learned.map(StringList::from)),
            next_period_focus: Set(self.next_period_focus.map(StringList::from)),
            satisfaction_score: Set(self.satisfaction_score),
            notes: Set(self.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub review_type: Option<ReviewType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accomplishments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_period_focus: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Shape for ReviewUpdate {
    fn schema() -> ObjectSchema {
        update_of(review_row())
    }
}

impl ReviewUpdate {
    pub fn apply_to(self, active: &mut review::ActiveModel) {
        if let Some(review_type) = self.review_type {
            active.review_type = Set(review_type);
        }
        if let Some(start) = self.period_start {
            active.period_start = Set(start);
        }
        if let Some(end) = self.period_end {
            active.period_end = Set(end);
        }
        if let Some(items) = self.accomplishments {
            active.accomplishments = Set(Some(StringList(items)));
        }
        if let Some(items) = self.challenges {
            active.challenges = Set(Some(StringList(items)));
        }
        if let Some(items) = self.lessons_learned {
            active.lessons_learned = Set(Some(StringList(items)));
        }
        if let Some(items) = self.next_period_focus {
            active.next_period_focus = Set(Some(StringList(items)));
        }
        if let Some(score) = self.satisfaction_score {
            active.satisfaction_score = Set(Some(score));
        }
        if let Some(notes) = self.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Goal, Profile, Review, Task, WeeklyPlan, WeeklyPlanItem};
    use crate::schema::IssueCode;
    use sea_orm::EntityName;
    use serde_json::json;

    const ID: &str = "0b6f3a52-4d1c-4f0e-9a57-3c2b8d1e6f10";
    const USER: &str = "5f1d7c2e-8a3b-4c6d-9e0f-1a2b3c4d5e6f";

    #[test]
    fn test_table_names_match_entities() {
        assert_eq!(Profile.table_name(), Table::Profiles.name());
        assert_eq!(Goal.table_name(), Table::Goals.name());
        assert_eq!(Task.table_name(), Table::Tasks.name());
        assert_eq!(WeeklyPlan.table_name(), Table::WeeklyPlans.name());
        assert_eq!(WeeklyPlanItem.table_name(), Table::WeeklyPlanItems.name());
        assert_eq!(Review.table_name(), Table::Reviews.name());
    }

    #[test]
    fn test_task_row_round_trip_is_unchanged() {
        let row = json!({
            "id": ID,
            "user_id": USER,
            "title": "Draft quarterly plan",
            "priority": "A",
            "rank": 2,
            "status": "IN_PROGRESS",
            "is_mit": true,
            "due_date": "2024-05-03T17:00:00Z",
            "estimated_minutes": 90,
            "created_at": "2024-05-01T09:30:00Z",
            "updated_at": "2024-05-01T09:30:00Z"
        });
        let parsed = task::Model::parse(&row).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), row);
        // Validating the re-serialized value yields the same row
        assert_eq!(task::Model::parse(&row).unwrap(), parsed);
    }

    #[test]
    fn test_task_row_minutes_fit_column() {
        let row = json!({
            "id": ID,
            "user_id": USER,
            "title": "Overlong",
            "priority": "B",
            "status": "PENDING",
            "estimated_minutes": 2_147_483_648_i64,
            "actual_minutes": 4_000_000_000_u64,
            "created_at": "2024-05-01T09:30:00Z",
            "updated_at": "2024-05-01T09:30:00Z"
        });
        let errors = task::Model::parse(&row).unwrap_err();
        let messages = errors.field_messages();
        assert_eq!(messages.len(), 2);
        assert!(messages.contains_key("estimated_minutes"));
        assert!(messages.contains_key("actual_minutes"));
    }

    #[test]
    fn test_review_and_plan_rows_round_trip() {
        let review_row = json!({
            "id": ID,
            "user_id": USER,
            "type": "WEEKLY",
            "period_start": "2024-04-28",
            "period_end": "2024-05-04",
            "accomplishments": ["Shipped the draft"],
            "satisfaction_score": 7,
            "created_at": "2024-05-04T18:00:00Z",
            "updated_at": "2024-05-04T18:00:00Z"
        });
        let review = review::Model::parse(&review_row).unwrap();
        assert_eq!(serde_json::to_value(&review).unwrap(), review_row);

        let plan_row = json!({
            "id": ID,
            "user_id": USER,
            "week_start_date": "2024-04-28",
            "week_end_date": "2024-05-04",
            "focus_areas": ["health", "writing"],
            "created_at": "2024-04-28T08:00:00Z",
            "updated_at": "2024-04-28T08:00:00Z"
        });
        let plan = weekly_plan::Model::parse(&plan_row).unwrap();
        assert_eq!(serde_json::to_value(&plan).unwrap(), plan_row);
    }

    #[test]
    fn test_row_defaults_applied() {
        let profile = profile::Model::parse(&json!({
            "id": ID,
            "user_id": USER,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "created_at": "2024-05-01T09:30:00Z",
            "updated_at": "2024-05-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(profile.timezone, DEFAULT_TIMEZONE);

        let insert = TaskInsert::parse(&json!({
            "user_id": USER,
            "title": "Call the bank",
            "priority": "B"
        }))
        .unwrap();
        assert_eq!(insert.status, TaskStatus::Pending);
        assert!(!insert.is_mit);
    }

    #[test]
    fn test_insert_shapes_omit_server_fields() {
        let schema = GoalInsert::schema();
        for name in ["id", "created_at", "updated_at"] {
            assert!(schema.presence_of(name).is_none(), "{name} should be omitted");
        }
        assert!(schema.presence_of("user_id").is_some());

        let item = WeeklyPlanItemInsert::schema();
        assert!(item.presence_of("id").is_none());
        assert!(item.presence_of("created_at").is_none());
    }

    #[test]
    fn test_update_requires_only_timestamp() {
        let stamp = json!({ "updated_at": "2024-05-02T10:00:00Z" });
        assert!(ProfileUpdate::parse(&stamp).is_ok());
        assert!(GoalUpdate::parse(&stamp).is_ok());
        assert!(TaskUpdate::parse(&stamp).is_ok());
        assert!(WeeklyPlanUpdate::parse(&stamp).is_ok());
        assert!(ReviewUpdate::parse(&stamp).is_ok());

        let errors = TaskUpdate::parse(&json!({})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].code, IssueCode::Required);
        assert_eq!(errors.issues()[0].path.to_string(), "updated_at");

        // Immutable columns are not part of the update shape
        let update = TaskUpdate::parse(&json!({
            "updated_at": "2024-05-02T10:00:00Z",
            "user_id": USER,
            "is_mit": true
        }))
        .unwrap();
        assert_eq!(update.is_mit, Some(true));
        assert!(TaskUpdate::schema().presence_of("user_id").is_none());

        // Partial update does not reintroduce defaults
        assert_eq!(update.status, None);
    }

    #[test]
    fn test_week_start_date_calendar_check() {
        let errors = WeeklyPlanInsert::parse(&json!({
            "user_id": USER,
            "week_start_date": "2024-13-01",
            "week_end_date": "2024-13-07"
        }))
        .unwrap_err();
        assert_eq!(errors.for_field("week_start_date").len(), 1);
        assert_eq!(errors.for_field("week_end_date").len(), 1);
    }

    #[test]
    fn test_plan_item_update_is_fully_optional() {
        let update = WeeklyPlanItemUpdate::parse(&json!({})).unwrap();
        assert_eq!(update, WeeklyPlanItemUpdate::default());
        assert!(WeeklyPlanItemUpdate::parse(&json!({ "rank": 6 })).is_err());
    }
}
