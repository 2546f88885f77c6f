//! Goal business logic - CRUD, tier ordering, hierarchy and progress.
//!
//! Goals form a tree in which every parent belongs to a strictly broader tier
//! (life, then three-year, then annual, then quarterly). The ordering is checked here on
//! every write that sets a parent or changes a tier.

use crate::{
    core::{contains_literal, report::calculate_progress},
    entities::{Goal, Task, goal, task},
    errors::{Error, Result},
    schema::{FieldPath, IssueCode, ValidationErrors},
    types::{
        GoalType, Pagination, TaskStatus,
        goals::{CreateGoal, GoalFilters, GoalProgress, GoalSort, GoalSortField, UpdateGoal},
    },
};
use chrono::Utc;
use sea_orm::{Condition, IntoActiveModel, Order, QueryOrder, QuerySelect, Set, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// A goal and the goals nested directly beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalNode {
    #[serde(flatten)]
    pub goal: goal::Model,
    pub children: Vec<GoalNode>,
}

/// Every goal of a user grouped by tier, each with its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoalHierarchy {
    pub life_goals: Vec<GoalNode>,
    pub three_year_goals: Vec<GoalNode>,
    pub annual_goals: Vec<GoalNode>,
    pub quarterly_goals: Vec<GoalNode>,
}

impl GoalHierarchy {
    #[must_use]
    pub fn tier(&self, goal_type: GoalType) -> &[GoalNode] {
        match goal_type {
            GoalType::Life => &self.life_goals,
            GoalType::ThreeYear => &self.three_year_goals,
            GoalType::Annual => &self.annual_goals,
            GoalType::Quarterly => &self.quarterly_goals,
        }
    }
}

fn parent_error(message: impl Into<String>) -> Error {
    ValidationErrors::single(
        FieldPath::root().key("parent_goal_id"),
        IssueCode::Custom,
        message,
    )
    .into()
}

/// Checks that `parent_id` names one of the user's goals with a broader tier than `child`.
async fn check_parent(
    db: &DatabaseConnection,
    user_id: Uuid,
    parent_id: Uuid,
    child: GoalType,
) -> Result<()> {
    let Some(parent) = find_goal(db, user_id, parent_id).await? else {
        return Err(parent_error("Parent goal not found"));
    };
    if !parent.goal_type.can_parent(child) {
        return Err(parent_error(format!(
            "A {} cannot be nested under a {}",
            child.label(),
            parent.goal_type.label()
        )));
    }
    Ok(())
}

async fn find_goal(
    db: &DatabaseConnection,
    user_id: Uuid,
    goal_id: Uuid,
) -> Result<Option<goal::Model>> {
    Goal::find_by_id(goal_id)
        .filter(goal::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a goal for `user_id`.
pub async fn create_goal(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: CreateGoal,
) -> Result<goal::Model> {
    if let Some(parent_id) = input.parent_goal_id {
        check_parent(db, user_id, parent_id, input.goal_type).await?;
    }

    let goal = input
        .into_insert(user_id)
        .into_active_model(Utc::now())
        .insert(db)
        .await?;
    Ok(goal)
}

/// Fetches one of the user's goals.
pub async fn get_goal(db: &DatabaseConnection, user_id: Uuid, goal_id: Uuid) -> Result<goal::Model> {
    find_goal(db, user_id, goal_id)
        .await?
        .ok_or_else(|| Error::not_found("goal", goal_id))
}

/// Lists the user's goals matching `filters`, ordered by `sort`, one page at a time.
pub async fn list_goals(
    db: &DatabaseConnection,
    user_id: Uuid,
    filters: &GoalFilters,
    sort: GoalSort,
    page: Pagination,
) -> Result<Vec<goal::Model>> {
    let mut query = Goal::find().filter(goal::Column::UserId.eq(user_id));

    if let Some(goal_type) = filters.goal_type {
        query = query.filter(goal::Column::GoalType.eq(goal_type));
    }
    if let Some(is_completed) = filters.is_completed {
        query = query.filter(goal::Column::IsCompleted.eq(is_completed));
    }
    if let Some(has_target_date) = filters.has_target_date {
        query = query.filter(if has_target_date {
            goal::Column::TargetDate.is_not_null()
        } else {
            goal::Column::TargetDate.is_null()
        });
    }
    if let Some(parent_id) = filters.parent_goal_id {
        query = query.filter(goal::Column::ParentGoalId.eq(parent_id));
    }
    if let Some(search) = filters.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let term = search.trim();
        query = query.filter(
            Condition::any()
                .add(goal::Column::Title.like(contains_literal(term)))
                .add(goal::Column::Description.like(contains_literal(term))),
        );
    }

    let column = match sort.field {
        GoalSortField::CreatedAt => goal::Column::CreatedAt,
        GoalSortField::UpdatedAt => goal::Column::UpdatedAt,
        GoalSortField::TargetDate => goal::Column::TargetDate,
        GoalSortField::Title => goal::Column::Title,
    };

    query
        .order_by(column, Order::from(sort.direction))
        .order_by_asc(goal::Column::Id)
        .offset(page.offset())
        .limit(page.limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies an edit to one of the user's goals.
///
/// Marking a goal complete stamps `completed_at`; marking it incomplete clears it.
/// A new parent or tier is checked against the tier ordering, including the tiers of
/// the goal's existing children.
pub async fn update_goal(
    db: &DatabaseConnection,
    user_id: Uuid,
    goal_id: Uuid,
    input: UpdateGoal,
) -> Result<goal::Model> {
    let existing = get_goal(db, user_id, goal_id).await?;
    let goal_type = input.goal_type.unwrap_or(existing.goal_type);

    if input.parent_goal_id == Some(goal_id) {
        return Err(parent_error("A goal cannot be its own parent"));
    }
    if input.parent_goal_id.is_some() || input.goal_type.is_some() {
        if let Some(parent_id) = input.parent_goal_id.or(existing.parent_goal_id) {
            check_parent(db, user_id, parent_id, goal_type).await?;
        }
    }
    if input.goal_type.is_some_and(|t| t != existing.goal_type) {
        let children = Goal::find()
            .filter(goal::Column::ParentGoalId.eq(goal_id))
            .all(db)
            .await?;
        if children.iter().any(|c| !goal_type.can_parent(c.goal_type)) {
            return Err(ValidationErrors::single(
                FieldPath::root().key("type"),
                IssueCode::Custom,
                format!("Existing sub-goals do not fit under a {}", goal_type.label()),
            )
            .into());
        }
    }

    let now = Utc::now();
    let completion = input.is_completed;
    let mut update = input.into_update(now);
    if completion == Some(true) && !existing.is_completed {
        update.completed_at = Some(now);
    }

    let mut active = existing.into_active_model();
    update.apply_to(&mut active);
    if completion == Some(false) {
        active.completed_at = Set(None);
    }
    active.update(db).await.map_err(Into::into)
}

/// Deletes one of the user's goals. Child goals and tasks are detached, not deleted.
pub async fn delete_goal(db: &DatabaseConnection, user_id: Uuid, goal_id: Uuid) -> Result<()> {
    let goal = get_goal(db, user_id, goal_id).await?;
    Goal::delete_by_id(goal.id).exec(db).await?;
    info!(%user_id, %goal_id, title = %goal.title, "Deleted goal");
    Ok(())
}

/// Number of the user's goals in each tier. Every tier is present, possibly with 0.
pub async fn count_goals_by_type(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<BTreeMap<GoalType, u64>> {
    let mut counts: BTreeMap<GoalType, u64> = GoalType::ALL.iter().map(|t| (*t, 0)).collect();
    let types: Vec<GoalType> = Goal::find()
        .select_only()
        .column(goal::Column::GoalType)
        .filter(goal::Column::UserId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;
    for goal_type in types {
        *counts.entry(goal_type).or_default() += 1;
    }
    Ok(counts)
}

fn build_node(goal: &goal::Model, children_of: &HashMap<Uuid, Vec<&goal::Model>>) -> GoalNode {
    let children = children_of
        .get(&goal.id)
        .map(|kids| {
            kids.iter()
                .filter(|child| goal.goal_type.can_parent(child.goal_type))
                .map(|child| build_node(child, children_of))
                .collect()
        })
        .unwrap_or_default();
    GoalNode {
        goal: goal.clone(),
        children,
    }
}

/// All of the user's goals grouped by tier, oldest first, each with its subtree.
///
/// A goal appears in its own tier's list and also inside its parent's `children`.
pub async fn goal_hierarchy(db: &DatabaseConnection, user_id: Uuid) -> Result<GoalHierarchy> {
    let goals = Goal::find()
        .filter(goal::Column::UserId.eq(user_id))
        .order_by_asc(goal::Column::CreatedAt)
        .all(db)
        .await?;

    let mut children_of: HashMap<Uuid, Vec<&goal::Model>> = HashMap::new();
    for goal in &goals {
        if let Some(parent_id) = goal.parent_goal_id {
            children_of.entry(parent_id).or_default().push(goal);
        }
    }

    let mut hierarchy = GoalHierarchy::default();
    for goal in &goals {
        let node = build_node(goal, &children_of);
        match goal.goal_type {
            GoalType::Life => hierarchy.life_goals.push(node),
            GoalType::ThreeYear => hierarchy.three_year_goals.push(node),
            GoalType::Annual => hierarchy.annual_goals.push(node),
            GoalType::Quarterly => hierarchy.quarterly_goals.push(node),
        }
    }
    Ok(hierarchy)
}

/// Completion progress of a goal, measured by the tasks attached to it.
pub async fn goal_progress(
    db: &DatabaseConnection,
    user_id: Uuid,
    goal_id: Uuid,
) -> Result<GoalProgress> {
    let goal = get_goal(db, user_id, goal_id).await?;
    let tasks = Task::find()
        .filter(task::Column::GoalId.eq(goal.id))
        .filter(task::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    let total_tasks = tasks.len() as u64;
    let completed_tasks = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count() as u64;

    Ok(GoalProgress {
        goal_id: goal.id,
        total_tasks,
        completed_tasks,
        progress_percentage: calculate_progress(completed_tasks, total_tasks),
        last_activity: tasks.iter().map(|t| t.updated_at).max(),
    })
}
