//! Dashboard reporting and display formatting.
//!
//! This module gathers the figures shown on the planning dashboard and provides the small
//! formatting helpers used to render them. All functions are framework-agnostic and
//! return structured data or plain strings.

use crate::{
    catalog::goal_limit,
    core::{
        goal::count_goals_by_type,
        weekly_plan::{PlanItemWithTask, find_weekly_plan, list_plan_items, week_bounds},
    },
    entities::{Task, task, weekly_plan},
    errors::Result,
    types::{GoalType, TaskStatus, tasks::MAX_DAILY_MITS},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Goals of one tier compared with the number the method recommends keeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierUsage {
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub count: u64,
    pub limit: usize,
}

impl TierUsage {
    #[must_use]
    pub fn new(goal_type: GoalType, count: u64) -> Self {
        Self {
            goal_type,
            count,
            limit: goal_limit(goal_type),
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count >= self.limit as u64
    }
}

/// Everything the dashboard shows for one user on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub life_goals: TierUsage,
    pub annual_goals: TierUsage,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// `None` until the user starts planning this week
    pub weekly_plan: Option<weekly_plan::Model>,
    pub planned_items: Vec<PlanItemWithTask>,
    pub mit_count: u64,
    pub mit_limit: usize,
    /// Pending or in progress
    pub open_tasks: u64,
}

impl DashboardSummary {
    /// Share of this week's planned tasks already completed.
    #[must_use]
    pub fn plan_progress(&self) -> f64 {
        let done = self
            .planned_items
            .iter()
            .filter(|p| p.task.as_ref().is_some_and(|t| t.status == TaskStatus::Completed))
            .count();
        calculate_progress(done as u64, self.planned_items.len() as u64)
    }
}

/// Collects the dashboard figures for `user_id` on `today`.
///
/// Reading the dashboard never starts a weekly plan; an unplanned week reports no items.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Owner of the goals, tasks and plans
/// * `today` - Day whose week is summarized
pub async fn dashboard_summary(
    db: &DatabaseConnection,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<DashboardSummary> {
    let counts = count_goals_by_type(db, user_id).await?;
    let tier = |goal_type: GoalType| {
        TierUsage::new(goal_type, counts.get(&goal_type).copied().unwrap_or_default())
    };

    let (week_start, week_end) = week_bounds(today);
    let weekly_plan = find_weekly_plan(db, user_id, today).await?;
    let planned_items = match &weekly_plan {
        Some(plan) => list_plan_items(db, user_id, plan.id).await?,
        None => Vec::new(),
    };

    let mit_count = Task::find()
        .filter(task::Column::UserId.eq(user_id))
        .filter(task::Column::IsMit.eq(true))
        .count(db)
        .await?;
    let open_tasks = Task::find()
        .filter(task::Column::UserId.eq(user_id))
        .filter(task::Column::Status.is_in([TaskStatus::Pending, TaskStatus::InProgress]))
        .count(db)
        .await?;

    debug!(%user_id, %week_start, planned = planned_items.len(), "Built dashboard summary");
    Ok(DashboardSummary {
        life_goals: tier(GoalType::Life),
        annual_goals: tier(GoalType::Annual),
        week_start,
        week_end,
        weekly_plan,
        planned_items,
        mit_count,
        mit_limit: MAX_DAILY_MITS,
        open_tasks,
    })
}

/// Calculates a completion percentage, rounded to a whole number.
///
/// # Arguments
/// * `completed` - Items done
/// * `total` - All items
///
/// # Returns
/// Percentage in 0-100, or 0 when there is nothing to complete
#[must_use]
pub fn calculate_progress(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = completed as f64 / total as f64;
    (ratio * 100.0).round()
}

/// Renders `percent` as a bar of `width` cells followed by the rounded figure.
///
/// Only the bar is clamped to 0-100; the figure is printed as given.
#[must_use]
pub fn format_progress_bar(percent: f64, width: usize) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let done = ((percent.clamp(0.0, 100.0) * width as f64) / 100.0).round() as usize;
    let bar: String = (0..width).map(|i| if i < done { '#' } else { '-' }).collect();
    format!("[{bar}] {percent:.0}%")
}

/// Formats a number of minutes as `45m`, `2h` or `1h 30m`.
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    match minutes % 60 {
        0 => format!("{hours}h"),
        rest => format!("{hours}h {rest}m"),
    }
}

/// Formats a date span as `Apr 28 - May 4`.
#[must_use]
pub fn format_week_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%b %-d"), end.format("%b %-d"))
}

/// One dashboard line per tier, e.g. `Life Goal: 2/3`.
#[must_use]
pub fn format_tier_usage(usage: &TierUsage) -> String {
    format!("{}: {}/{}", usage.goal_type.label(), usage.count, usage.limit)
}
