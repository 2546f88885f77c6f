//! Task input, filter, planning and analytics shapes.

use super::common::{GoalType, Priority, SortDirection, TaskStatus};
use super::database::{TaskInsert, TaskUpdate};
use super::goals::{description, title};
use crate::entities::task;
use crate::schema::{
    ObjectSchema, Shape, array, boolean, date, date_time, enumeration, int32, integer, number,
    object, string, uuid,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound for any single time estimate or block, in minutes.
pub const MAX_TASK_MINUTES: i32 = 480;

/// Daily cap on Most Important Tasks.
pub const MAX_DAILY_MITS: usize = 3;

fn create_task_schema() -> ObjectSchema {
    object()
        .field("title", title())
        .optional("description", description())
        .field("priority", Priority::schema())
        .optional("rank", integer().min(1.0).max(5.0))
        .with_default("is_mit", boolean(), false)
        .optional("goal_id", uuid())
        .optional("due_date", date_time())
        .optional(
            "estimated_minutes",
            integer().positive().max(f64::from(MAX_TASK_MINUTES)),
        )
}

/// User input for a new task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    pub is_mit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i32>,
}

impl Shape for CreateTask {
    fn schema() -> ObjectSchema {
        create_task_schema()
    }
}

impl CreateTask {
    #[must_use]
    pub fn into_insert(self, user_id: Uuid) -> TaskInsert {
        TaskInsert {
            user_id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            rank: self.rank,
            status: TaskStatus::Pending,
            is_mit: self.is_mit,
            goal_id: self.goal_id,
            due_date: self.due_date,
            completed_at: None,
            estimated_minutes: self.estimated_minutes,
            actual_minutes: None,
        }
    }
}

/// User input for editing a task, including status transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<i32>,
}

impl Shape for UpdateTask {
    fn schema() -> ObjectSchema {
        create_task_schema().partial().extend(
            object()
                .optional("status", TaskStatus::schema())
                .optional("actual_minutes", int32().positive()),
        )
    }
}

impl UpdateTask {
    /// Storage update stamped with `now`. `completed_at` is left to the caller.
    #[must_use]
    pub fn into_update(self, now: DateTime<Utc>) -> TaskUpdate {
        TaskUpdate {
            title: self.title,
            description: self.description,
            priority: self.priority,
            rank: self.rank,
            status: self.status,
            is_mit: self.is_mit,
            goal_id: self.goal_id,
            due_date: self.due_date,
            estimated_minutes: self.estimated_minutes,
            actual_minutes: self.actual_minutes,
            ..TaskUpdate::touch(now)
        }
    }
}

/// Summary of the goal a task serves, attached to task listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
}

/// A task row together with its goal, if it has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskWithGoal {
    #[serde(flatten)]
    pub task: task::Model,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalSummary>,
}

/// Inclusive timestamp window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Sparse predicates for listing tasks. Absent members do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_due_date: Option<bool>,
    /// Due before now and still open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_overdue: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Due date falls inside the window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateTimeRange>,
}

impl Shape for TaskFilters {
    fn schema() -> ObjectSchema {
        object()
            .optional("priority", Priority::schema())
            .optional("status", TaskStatus::schema())
            .optional("is_mit", boolean())
            .optional("goal_id", uuid())
            .optional("has_due_date", boolean())
            .optional("is_overdue", boolean())
            .optional("search", string())
            .optional(
                "date_range",
                object()
                    .field("start", date_time())
                    .field("end", date_time()),
            )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Title,
}

impl TaskSortField {
    pub const VALUES: &'static [&'static str] =
        &["created_at", "updated_at", "due_date", "priority", "title"];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub direction: SortDirection,
}

impl Shape for TaskSort {
    fn schema() -> ObjectSchema {
        object()
            .with_default("field", enumeration(TaskSortField::VALUES), "created_at")
            .with_default("direction", enumeration(SortDirection::VALUES), "desc")
    }
}

/// Length of a Swiss Cheese increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NudgeDuration {
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "15")]
    Fifteen,
}

impl NudgeDuration {
    pub const VALUES: &'static [&'static str] = &["5", "10", "15"];

    #[must_use]
    pub const fn minutes(self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Fifteen => 15,
        }
    }
}

/// Suggestion to chip away at a task in a small time-boxed increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwissCheeseNudge {
    pub task_id: Uuid,
    pub suggested_duration: NudgeDuration,
    pub suggested_action: String,
    pub reason: String,
}

impl Shape for SwissCheeseNudge {
    fn schema() -> ObjectSchema {
        object()
            .field("task_id", uuid())
            .field("suggested_duration", enumeration(NudgeDuration::VALUES))
            .field("suggested_action", string())
            .field("reason", string())
    }
}

/// Scheduled block of work on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub task_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub is_completed: bool,
}

impl Shape for TimeBlock {
    fn schema() -> ObjectSchema {
        object()
            .field("task_id", uuid())
            .field("start_time", date_time())
            .field(
                "duration_minutes",
                integer().positive().max(f64::from(MAX_TASK_MINUTES)),
            )
            .with_default("is_completed", boolean(), false)
    }
}

impl TimeBlock {
    #[must_use]
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + chrono::Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Task counts per priority band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    #[serde(rename = "A")]
    pub a: u64,
    #[serde(rename = "B")]
    pub b: u64,
    #[serde(rename = "C")]
    pub c: u64,
}

impl PriorityBreakdown {
    pub fn add(&mut self, priority: Priority) {
        match priority {
            Priority::A => self.a += 1,
            Priority::B => self.b += 1,
            Priority::C => self.c += 1,
        }
    }
}

/// Completion statistics over a user's tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalytics {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    pub overdue_tasks: u64,
    pub completion_rate: f64,
    /// Mean `actual_minutes` of completed tasks that recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_completion_time: Option<f64>,
    pub priority_breakdown: PriorityBreakdown,
    pub mit_completion_rate: f64,
}

impl Shape for TaskAnalytics {
    fn schema() -> ObjectSchema {
        let count = || integer().min(0.0);
        object()
            .field("total_tasks", count())
            .field("completed_tasks", count())
            .field("pending_tasks", count())
            .field("overdue_tasks", count())
            .field("completion_rate", number().min(0.0).max(100.0))
            .optional("average_completion_time", number())
            .field(
                "priority_breakdown",
                object()
                    .field("A", count())
                    .field("B", count())
                    .field("C", count()),
            )
            .field("mit_completion_rate", number().min(0.0).max(100.0))
    }
}

/// The Most Important Tasks chosen for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMits {
    pub date: NaiveDate,
    pub tasks: Vec<Uuid>,
}

impl Shape for DailyMits {
    fn schema() -> ObjectSchema {
        object()
            .field("date", date())
            .field("tasks", array(uuid()).max(MAX_DAILY_MITS))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::schema::IssueCode;
    use serde_json::json;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|_| Uuid::new_v4().to_string()).collect()
    }

    #[test]
    fn test_task_title_bounds() {
        for len in [1, 2, 100, 199, 200] {
            let input = json!({ "title": "t".repeat(len), "priority": "A" });
            assert!(CreateTask::parse(&input).is_ok(), "length {len} should pass");
        }
        for len in [0, 201] {
            let input = json!({ "title": "t".repeat(len), "priority": "A" });
            let errors = CreateTask::parse(&input).unwrap_err();
            assert_eq!(errors.for_field("title").len(), 1, "length {len} should fail");
        }
    }

    #[test]
    fn test_task_priority_closed_set() {
        for priority in ["A", "B", "C"] {
            assert!(CreateTask::parse(&json!({ "title": "x", "priority": priority })).is_ok());
        }
        for priority in ["D", "a", "", "AA"] {
            let errors =
                CreateTask::parse(&json!({ "title": "x", "priority": priority })).unwrap_err();
            assert_eq!(
                errors.for_field("priority")[0].code,
                IssueCode::InvalidEnumValue
            );
        }
    }

    #[test]
    fn test_create_task_defaults_and_limits() {
        let task = CreateTask::parse(&json!({ "title": "Inbox zero", "priority": "B" })).unwrap();
        assert!(!task.is_mit);

        let errors = CreateTask::parse(&json!({
            "title": "Deep work",
            "priority": "A",
            "estimated_minutes": 481,
            "rank": 0
        }))
        .unwrap_err();
        assert_eq!(errors.len(), 2);

        let insert = CreateTask::parse(&json!({
            "title": "Deep work",
            "priority": "A",
            "estimated_minutes": 480
        }))
        .unwrap()
        .into_insert(Uuid::new_v4());
        assert_eq!(insert.status, TaskStatus::Pending);
        assert_eq!(insert.estimated_minutes, Some(480));
    }

    #[test]
    fn test_update_task_accepts_status_and_actuals() {
        let update = UpdateTask::parse(&json!({
            "status": "COMPLETED",
            "actual_minutes": 35
        }))
        .unwrap();
        assert_eq!(update.status, Some(TaskStatus::Completed));
        assert_eq!(update.actual_minutes, Some(35));
        assert_eq!(update.is_mit, None);

        assert!(UpdateTask::parse(&json!({ "status": "DONE" })).is_err());
        assert!(UpdateTask::parse(&json!({ "actual_minutes": 0 })).is_err());
    }

    #[test]
    fn test_daily_mits_limits() {
        let date = "2024-05-01";
        assert!(DailyMits::parse(&json!({ "date": date, "tasks": ids(3) })).is_ok());
        assert!(DailyMits::parse(&json!({ "date": date, "tasks": [] })).is_ok());

        let errors = DailyMits::parse(&json!({ "date": date, "tasks": ids(4) })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].code, IssueCode::TooBig);
        assert_eq!(errors.issues()[0].path.to_string(), "tasks");
    }

    #[test]
    fn test_daily_mits_bad_element_index() {
        let mut tasks = ids(3);
        tasks[1] = "1234".to_string();
        let errors = DailyMits::parse(&json!({ "date": "2024-05-01", "tasks": tasks })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].path.to_string(), "tasks[1]");
        assert_eq!(errors.issues()[0].code, IssueCode::InvalidFormat);
    }

    #[test]
    fn test_daily_mits_date_format() {
        let errors = DailyMits::parse(&json!({ "date": "05/01/2024", "tasks": [] })).unwrap_err();
        assert_eq!(errors.issues()[0].message, "Invalid date format");
    }

    #[test]
    fn test_task_filters_date_range_paths() {
        let filters = TaskFilters::parse(&json!({
            "is_overdue": true,
            "date_range": { "start": "2024-05-01T00:00:00Z", "end": "2024-05-31T23:59:59Z" }
        }))
        .unwrap();
        assert_eq!(filters.is_overdue, Some(true));
        assert!(filters.date_range.is_some());

        let errors = TaskFilters::parse(&json!({
            "date_range": { "start": "2024-05-01" }
        }))
        .unwrap_err();
        let paths: Vec<String> = errors.issues().iter().map(|i| i.path.to_string()).collect();
        assert_eq!(paths, vec!["date_range.start", "date_range.end"]);
    }

    #[test]
    fn test_swiss_cheese_and_time_block() {
        let task_id = Uuid::new_v4().to_string();
        let nudge = SwissCheeseNudge::parse(&json!({
            "task_id": task_id,
            "suggested_duration": "10",
            "suggested_action": "Outline the first section",
            "reason": "Untouched for a week"
        }))
        .unwrap();
        assert_eq!(nudge.suggested_duration.minutes(), 10);
        assert!(
            SwissCheeseNudge::parse(&json!({
                "task_id": task_id,
                "suggested_duration": "20",
                "suggested_action": "x",
                "reason": "y"
            }))
            .is_err()
        );

        let block = TimeBlock::parse(&json!({
            "task_id": task_id,
            "start_time": "2024-05-01T09:00:00Z",
            "duration_minutes": 90
        }))
        .unwrap();
        assert!(!block.is_completed);
        assert_eq!(block.end_time().to_rfc3339(), "2024-05-01T10:30:00+00:00");
    }

    #[test]
    fn test_minutes_beyond_column_range_keep_their_path() {
        let errors = UpdateTask::parse(&json!({ "actual_minutes": 3_000_000_000_u64 })).unwrap_err();
        assert_eq!(errors.len(), 1);
        let issue = &errors.issues()[0];
        assert_eq!(issue.path.to_string(), "actual_minutes");
        assert_eq!(issue.code, IssueCode::TooBig);

        let update = UpdateTask::parse(&json!({ "actual_minutes": i32::MAX })).unwrap();
        assert_eq!(update.actual_minutes, Some(i32::MAX));
    }

    #[test]
    fn test_task_analytics_shape() {
        let analytics = TaskAnalytics {
            total_tasks: 4,
            completed_tasks: 2,
            pending_tasks: 2,
            overdue_tasks: 1,
            completion_rate: 50.0,
            average_completion_time: None,
            priority_breakdown: PriorityBreakdown { a: 2, b: 1, c: 1 },
            mit_completion_rate: 100.0,
        };
        let value = serde_json::to_value(&analytics).unwrap();
        assert_eq!(value["priority_breakdown"]["A"], json!(2));
        assert_eq!(TaskAnalytics::parse(&value).unwrap(), analytics);
    }
}
