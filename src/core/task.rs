//! Task business logic - CRUD, filtered listings, daily MITs and analytics.

use crate::{
    core::{contains_literal, report::calculate_progress},
    entities::{Goal, Task, goal, task},
    errors::{Error, Result},
    schema::{FieldPath, Issue, IssueCode, ValidationErrors},
    types::{
        Pagination, TaskStatus,
        tasks::{
            CreateTask, DailyMits, GoalSummary, PriorityBreakdown, TaskAnalytics, TaskFilters,
            TaskSort, TaskSortField, TaskWithGoal, UpdateTask,
        },
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, IntoActiveModel, Order, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use std::collections::HashSet;
use tracing::{debug, info};

const OPEN_STATUSES: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::InProgress];

fn goal_error(message: &str) -> Error {
    ValidationErrors::single(FieldPath::root().key("goal_id"), IssueCode::Custom, message).into()
}

/// Checks that `goal_id` names one of the user's goals.
async fn check_goal(db: &DatabaseConnection, user_id: Uuid, goal_id: Uuid) -> Result<()> {
    let exists = Goal::find_by_id(goal_id)
        .filter(goal::Column::UserId.eq(user_id))
        .count(db)
        .await?
        > 0;
    if exists {
        Ok(())
    } else {
        Err(goal_error("Goal not found"))
    }
}

/// Open tasks whose due date has passed at `now`.
fn overdue(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(task::Column::DueDate.is_not_null())
        .add(task::Column::DueDate.lt(now))
        .add(task::Column::Status.is_in(OPEN_STATUSES))
}

fn filtered(user_id: Uuid, filters: &TaskFilters, now: DateTime<Utc>) -> Select<Task> {
    let mut query = Task::find().filter(task::Column::UserId.eq(user_id));

    if let Some(priority) = filters.priority {
        query = query.filter(task::Column::Priority.eq(priority));
    }
    if let Some(status) = filters.status {
        query = query.filter(task::Column::Status.eq(status));
    }
    if let Some(is_mit) = filters.is_mit {
        query = query.filter(task::Column::IsMit.eq(is_mit));
    }
    if let Some(goal_id) = filters.goal_id {
        query = query.filter(task::Column::GoalId.eq(goal_id));
    }
    if let Some(has_due_date) = filters.has_due_date {
        query = query.filter(if has_due_date {
            task::Column::DueDate.is_not_null()
        } else {
            task::Column::DueDate.is_null()
        });
    }
    if let Some(is_overdue) = filters.is_overdue {
        query = query.filter(if is_overdue {
            overdue(now)
        } else {
            overdue(now).not()
        });
    }
    if let Some(search) = filters.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let term = search.trim();
        query = query.filter(
            Condition::any()
                .add(task::Column::Title.like(contains_literal(term)))
                .add(task::Column::Description.like(contains_literal(term))),
        );
    }
    if let Some(range) = filters.date_range {
        query = query.filter(task::Column::DueDate.between(range.start, range.end));
    }
    query
}

fn sorted(query: Select<Task>, sort: TaskSort, page: Pagination) -> Select<Task> {
    let column = match sort.field {
        TaskSortField::CreatedAt => task::Column::CreatedAt,
        TaskSortField::UpdatedAt => task::Column::UpdatedAt,
        TaskSortField::DueDate => task::Column::DueDate,
        TaskSortField::Priority => task::Column::Priority,
        TaskSortField::Title => task::Column::Title,
    };
    query
        .order_by(column, Order::from(sort.direction))
        .order_by_asc(task::Column::Id)
        .offset(page.offset())
        .limit(page.limit)
}

/// Creates a task for `user_id`. A referenced goal must belong to the same user.
pub async fn create_task(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: CreateTask,
) -> Result<task::Model> {
    if let Some(goal_id) = input.goal_id {
        check_goal(db, user_id, goal_id).await?;
    }

    let task = input
        .into_insert(user_id)
        .into_active_model(Utc::now())
        .insert(db)
        .await?;
    Ok(task)
}

/// Fetches one of the user's tasks.
pub async fn get_task(db: &DatabaseConnection, user_id: Uuid, task_id: Uuid) -> Result<task::Model> {
    Task::find_by_id(task_id)
        .filter(task::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("task", task_id))
}

/// Lists the user's tasks matching `filters`, ordered by `sort`, one page at a time.
///
/// `is_overdue` and `date_range` apply to the due date; a task is overdue when its
/// due date has passed and it is still pending or in progress.
pub async fn list_tasks(
    db: &DatabaseConnection,
    user_id: Uuid,
    filters: &TaskFilters,
    sort: TaskSort,
    page: Pagination,
) -> Result<Vec<task::Model>> {
    sorted(filtered(user_id, filters, Utc::now()), sort, page)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Same as [`list_tasks`], with a summary of each task's goal attached.
pub async fn list_tasks_with_goal(
    db: &DatabaseConnection,
    user_id: Uuid,
    filters: &TaskFilters,
    sort: TaskSort,
    page: Pagination,
) -> Result<Vec<TaskWithGoal>> {
    let rows = sorted(filtered(user_id, filters, Utc::now()), sort, page)
        .find_also_related(Goal)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(task, goal)| TaskWithGoal {
            task,
            goal: goal.map(|g| GoalSummary {
                id: g.id,
                title: g.title,
                goal_type: g.goal_type,
            }),
        })
        .collect())
}

/// Applies an edit to one of the user's tasks.
///
/// Moving to `COMPLETED` stamps `completed_at`; moving to any other status clears it.
pub async fn update_task(
    db: &DatabaseConnection,
    user_id: Uuid,
    task_id: Uuid,
    input: UpdateTask,
) -> Result<task::Model> {
    let existing = get_task(db, user_id, task_id).await?;
    if let Some(goal_id) = input.goal_id {
        check_goal(db, user_id, goal_id).await?;
    }

    let now = Utc::now();
    let status = input.status;
    let mut update = input.into_update(now);
    if status == Some(TaskStatus::Completed) && existing.status != TaskStatus::Completed {
        update.completed_at = Some(now);
    }

    let mut active = existing.into_active_model();
    update.apply_to(&mut active);
    if status.is_some_and(|s| s != TaskStatus::Completed) {
        active.completed_at = Set(None);
    }
    active.update(db).await.map_err(Into::into)
}

/// Deletes one of the user's tasks along with its weekly plan entries.
pub async fn delete_task(db: &DatabaseConnection, user_id: Uuid, task_id: Uuid) -> Result<()> {
    let task = get_task(db, user_id, task_id).await?;
    Task::delete_by_id(task.id).exec(db).await?;
    info!(%user_id, %task_id, title = %task.title, "Deleted task");
    Ok(())
}

/// Makes exactly the listed tasks the user's Most Important Tasks.
///
/// Every listed task must belong to the user; an unknown id is reported at its index.
/// Tasks that were MITs but are not listed lose the flag. Both steps run in one
/// transaction, so the MIT set is never observed half-updated.
pub async fn set_daily_mits(
    db: &DatabaseConnection,
    user_id: Uuid,
    mits: &DailyMits,
) -> Result<Vec<task::Model>> {
    let txn = db.begin().await?;

    let owned: HashSet<Uuid> = Task::find()
        .select_only()
        .column(task::Column::Id)
        .filter(task::Column::UserId.eq(user_id))
        .filter(task::Column::Id.is_in(mits.tasks.iter().copied()))
        .into_tuple::<Uuid>()
        .all(&txn)
        .await?
        .into_iter()
        .collect();

    let mut errors = ValidationErrors::new();
    for (index, id) in mits.tasks.iter().enumerate() {
        if !owned.contains(id) {
            errors.push(Issue::new(
                FieldPath::root().key("tasks").index(index),
                IssueCode::Custom,
                "Task not found",
            ));
        }
    }
    errors.into_result()?;

    let now = Utc::now();
    let cleared = Task::update_many()
        .col_expr(task::Column::IsMit, Expr::value(false))
        .col_expr(task::Column::UpdatedAt, Expr::value(now))
        .filter(task::Column::UserId.eq(user_id))
        .filter(task::Column::IsMit.eq(true))
        .filter(task::Column::Id.is_not_in(mits.tasks.iter().copied()))
        .exec(&txn)
        .await?;

    Task::update_many()
        .col_expr(task::Column::IsMit, Expr::value(true))
        .col_expr(task::Column::UpdatedAt, Expr::value(now))
        .filter(task::Column::UserId.eq(user_id))
        .filter(task::Column::Id.is_in(mits.tasks.iter().copied()))
        .exec(&txn)
        .await?;

    let selected = Task::find()
        .filter(task::Column::UserId.eq(user_id))
        .filter(task::Column::IsMit.eq(true))
        .order_by_asc(task::Column::Priority)
        .order_by_asc(task::Column::CreatedAt)
        .all(&txn)
        .await?;

    txn.commit().await?;

    info!(
        %user_id,
        date = %mits.date,
        selected = selected.len(),
        cleared = cleared.rows_affected,
        "Reassigned daily MITs"
    );
    Ok(selected)
}

/// Completion statistics over all of the user's tasks at `now`.
pub async fn task_analytics(
    db: &DatabaseConnection,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<TaskAnalytics> {
    let tasks = Task::find()
        .filter(task::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    let mut completed = 0_u64;
    let mut pending = 0_u64;
    let mut overdue = 0_u64;
    let mut mits = 0_u64;
    let mut mits_completed = 0_u64;
    let mut durations = Vec::new();
    let mut priority_breakdown = PriorityBreakdown::default();

    for task in &tasks {
        priority_breakdown.add(task.priority);
        let done = task.status == TaskStatus::Completed;
        if done {
            completed += 1;
            durations.extend(task.actual_minutes);
        }
        if task.status.is_open() {
            pending += 1;
            if task.due_date.is_some_and(|due| due < now) {
                overdue += 1;
            }
        }
        if task.is_mit {
            mits += 1;
            if done {
                mits_completed += 1;
            }
        }
    }

    let total = tasks.len() as u64;
    #[allow(clippy::cast_precision_loss)]
    let average_completion_time = (!durations.is_empty()).then(|| {
        durations.iter().map(|m| f64::from(*m)).sum::<f64>() / durations.len() as f64
    });

    debug!(%user_id, total, completed, overdue, "Computed task analytics");
    Ok(TaskAnalytics {
        total_tasks: total,
        completed_tasks: completed,
        pending_tasks: pending,
        overdue_tasks: overdue,
        completion_rate: calculate_progress(completed, total),
        average_completion_time,
        priority_breakdown,
        mit_completion_rate: calculate_progress(mits_completed, mits),
    })
}
