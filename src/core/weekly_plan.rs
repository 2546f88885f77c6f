//! Weekly planning business logic.
//!
//! A plan covers one calendar week, Sunday through Saturday, and holds items that
//! schedule the user's tasks for that week at their own priority and rank.

use crate::{
    entities::{Task, WeeklyPlan, WeeklyPlanItem, task, weekly_plan, weekly_plan_item},
    errors::{Error, Result},
    schema::{FieldPath, IssueCode, ValidationErrors},
    types::database::{
        WeeklyPlanInsert, WeeklyPlanItemInsert, WeeklyPlanItemUpdate, WeeklyPlanUpdate,
    },
};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use sea_orm::{
    IntoActiveModel, Order, QueryOrder, SqlErr,
    prelude::*,
    sea_query::{NullOrdering, OnConflict},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A plan item together with the task it schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItemWithTask {
    #[serde(flatten)]
    pub item: weekly_plan_item::Model,
    pub task: Option<task::Model>,
}

/// First (Sunday) and last (Saturday) day of the week containing `date`.
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
    (start, start + Duration::days(6))
}

fn invalid(field: &str, message: &str) -> Error {
    ValidationErrors::single(FieldPath::root().key(field), IssueCode::Custom, message).into()
}

/// Fetches one of the user's plans.
pub async fn get_weekly_plan(
    db: &DatabaseConnection,
    user_id: Uuid,
    plan_id: Uuid,
) -> Result<weekly_plan::Model> {
    WeeklyPlan::find_by_id(plan_id)
        .filter(weekly_plan::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("weekly_plan", plan_id))
}

/// The user's plan for the week containing `date`, if one was started.
pub async fn find_weekly_plan(
    db: &DatabaseConnection,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<weekly_plan::Model>> {
    let (start, _) = week_bounds(date);
    WeeklyPlan::find()
        .filter(weekly_plan::Column::UserId.eq(user_id))
        .filter(weekly_plan::Column::WeekStartDate.eq(start))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the plan for the week containing `date`, starting an empty one if needed.
///
/// The unique `(user_id, week_start_date)` index makes concurrent calls agree on one row.
pub async fn get_or_create_weekly_plan(
    db: &DatabaseConnection,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<weekly_plan::Model> {
    let (week_start_date, week_end_date) = week_bounds(date);
    let row = WeeklyPlanInsert {
        user_id,
        week_start_date,
        week_end_date,
        focus_areas: None,
        notes: None,
    }
    .into_active_model(Utc::now());

    let inserted = WeeklyPlan::insert(row)
        .on_conflict(
            OnConflict::columns([weekly_plan::Column::UserId, weekly_plan::Column::WeekStartDate])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted > 0 {
        info!(%user_id, week = %week_start_date, "Started weekly plan");
    }

    find_weekly_plan(db, user_id, date)
        .await?
        .ok_or_else(|| Error::not_found("weekly_plan", week_start_date))
}

fn week_taken() -> Error {
    invalid("week_start_date", "A plan for this week already exists")
}

/// Applies an update shape to one of the user's plans.
///
/// The resulting week must still start on a Sunday, end six days later and not be
/// planned already.
pub async fn update_weekly_plan(
    db: &DatabaseConnection,
    user_id: Uuid,
    plan_id: Uuid,
    update: WeeklyPlanUpdate,
) -> Result<weekly_plan::Model> {
    let plan = get_weekly_plan(db, user_id, plan_id).await?;

    let start = update.week_start_date.unwrap_or(plan.week_start_date);
    let end = update.week_end_date.unwrap_or(plan.week_end_date);
    if start.weekday() != Weekday::Sun {
        return Err(invalid("week_start_date", "Week must start on a Sunday"));
    }
    if end != start + Duration::days(6) {
        return Err(invalid("week_end_date", "Week must end on the Saturday after it starts"));
    }
    if start != plan.week_start_date && find_weekly_plan(db, user_id, start).await?.is_some() {
        return Err(week_taken());
    }

    let mut active = plan.into_active_model();
    update.apply_to(&mut active);
    active.update(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => week_taken(),
        _ => e.into(),
    })
}

/// Schedules one of the user's tasks into one of the user's plans.
///
/// A task appears at most once per plan.
pub async fn add_plan_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    item: WeeklyPlanItemInsert,
) -> Result<weekly_plan_item::Model> {
    let plan = get_weekly_plan(db, user_id, item.weekly_plan_id).await?;

    let task_owned = Task::find_by_id(item.task_id)
        .filter(task::Column::UserId.eq(user_id))
        .count(db)
        .await?
        > 0;
    if !task_owned {
        return Err(invalid("task_id", "Task not found"));
    }

    let already_planned = WeeklyPlanItem::find()
        .filter(weekly_plan_item::Column::WeeklyPlanId.eq(plan.id))
        .filter(weekly_plan_item::Column::TaskId.eq(item.task_id))
        .count(db)
        .await?
        > 0;
    if already_planned {
        return Err(invalid("task_id", "Task is already in this plan"));
    }

    let created = item.into_active_model(Utc::now()).insert(db).await?;
    debug!(%user_id, plan_id = %plan.id, task_id = %created.task_id, "Added plan item");
    Ok(created)
}

/// Fetches a plan item, checking the plan belongs to the user.
async fn find_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    item_id: Uuid,
) -> Result<weekly_plan_item::Model> {
    match WeeklyPlanItem::find_by_id(item_id)
        .find_also_related(WeeklyPlan)
        .one(db)
        .await?
    {
        Some((item, Some(plan))) if plan.user_id == user_id => Ok(item),
        _ => Err(Error::not_found("weekly_plan_item", item_id)),
    }
}

/// Changes the weekly priority, rank or MIT flag of a plan item.
pub async fn update_plan_item(
    db: &DatabaseConnection,
    user_id: Uuid,
    item_id: Uuid,
    update: WeeklyPlanItemUpdate,
) -> Result<weekly_plan_item::Model> {
    let mut active = find_item(db, user_id, item_id).await?.into_active_model();
    update.apply_to(&mut active);
    active.update(db).await.map_err(Into::into)
}

/// Items of one of the user's plans, by weekly priority then rank (unranked last).
pub async fn list_plan_items(
    db: &DatabaseConnection,
    user_id: Uuid,
    plan_id: Uuid,
) -> Result<Vec<PlanItemWithTask>> {
    let plan = get_weekly_plan(db, user_id, plan_id).await?;

    let rows = WeeklyPlanItem::find()
        .filter(weekly_plan_item::Column::WeeklyPlanId.eq(plan.id))
        .order_by_asc(weekly_plan_item::Column::Priority)
        .order_by_with_nulls(weekly_plan_item::Column::Rank, Order::Asc, NullOrdering::Last)
        .order_by_asc(weekly_plan_item::Column::CreatedAt)
        .find_also_related(Task)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(item, task)| PlanItemWithTask { item, task })
        .collect())
}

/// Takes a task out of a plan. The task itself is kept.
pub async fn remove_plan_item(db: &DatabaseConnection, user_id: Uuid, item_id: Uuid) -> Result<()> {
    let item = find_item(db, user_id, item_id).await?;
    WeeklyPlanItem::delete_by_id(item.id).exec(db).await?;
    debug!(%user_id, %item_id, "Removed plan item");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::schema::Shape;
    use crate::test_utils::*;
    use crate::types::Priority;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn item(plan_id: Uuid, task_id: Uuid, priority: Priority, rank: Option<i32>) -> WeeklyPlanItemInsert {
        WeeklyPlanItemInsert {
            weekly_plan_id: plan_id,
            task_id,
            priority,
            rank,
            is_mit: false,
        }
    }

    #[test]
    fn test_week_bounds() {
        // 2024-05-01 is a Wednesday
        assert_eq!(week_bounds(day("2024-05-01")), (day("2024-04-28"), day("2024-05-04")));
        // Sunday starts its own week, Saturday ends it
        assert_eq!(week_bounds(day("2024-04-28")).0, day("2024-04-28"));
        assert_eq!(week_bounds(day("2024-05-04")).0, day("2024-04-28"));
        // Across a year boundary
        assert_eq!(week_bounds(day("2025-01-01")), (day("2024-12-29"), day("2025-01-04")));
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_week() -> Result<()> {
        let (db, user_id) = setup_with_user().await?;

        let monday = get_or_create_weekly_plan(&db, user_id, day("2024-04-29")).await?;
        let friday = get_or_create_weekly_plan(&db, user_id, day("2024-05-03")).await?;
        assert_eq!(monday.id, friday.id);
        assert_eq!(monday.week_start_date, day("2024-04-28"));
        assert_eq!(monday.week_end_date, day("2024-05-04"));

        let next = get_or_create_weekly_plan(&db, user_id, day("2024-05-05")).await?;
        assert_ne!(next.id, monday.id);

        let other = get_or_create_weekly_plan(&db, Uuid::new_v4(), day("2024-04-29")).await?;
        assert_ne!(other.id, monday.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_leaves_one_plan() -> Result<()> {
        let (db, user_id) = setup_with_user().await?;

        let (a, b) = tokio::join!(
            get_or_create_weekly_plan(&db, user_id, day("2024-04-29")),
            get_or_create_weekly_plan(&db, user_id, day("2024-05-02")),
        );
        assert_eq!(a?.id, b?.id);

        let plans = WeeklyPlan::find()
            .filter(weekly_plan::Column::UserId.eq(user_id))
            .count(&db)
            .await?;
        assert_eq!(plans, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_week_already_planned() -> Result<()> {
        let (db, user_id) = setup_with_user().await?;
        let current = get_or_create_weekly_plan(&db, user_id, day("2024-05-01")).await?;
        let next = get_or_create_weekly_plan(&db, user_id, day("2024-05-08")).await?;
        assert_eq!(next.week_start_date, day("2024-05-05"));

        let moved = WeeklyPlanUpdate::parse(&json!({
            "week_start_date": "2024-04-28",
            "week_end_date": "2024-05-04",
            "updated_at": Utc::now().to_rfc3339()
        }))
        .unwrap();
        let errors = update_weekly_plan(&db, user_id, next.id, moved).await.unwrap_err();
        let messages = errors.validation().unwrap().field_messages();
        assert_eq!(messages["week_start_date"], vec!["A plan for this week already exists"]);

        let same_week = WeeklyPlan::find()
            .filter(weekly_plan::Column::UserId.eq(user_id))
            .filter(weekly_plan::Column::WeekStartDate.eq(day("2024-04-28")))
            .all(&db)
            .await?;
        assert_eq!(same_week.len(), 1);
        assert_eq!(same_week[0].id, current.id);

        // Another user's plan for that week is no conflict
        let stranger = Uuid::new_v4();
        let theirs = get_or_create_weekly_plan(&db, stranger, day("2024-05-08")).await?;
        let moved = WeeklyPlanUpdate::parse(&json!({
            "week_start_date": "2024-04-28",
            "week_end_date": "2024-05-04",
            "updated_at": Utc::now().to_rfc3339()
        }))
        .unwrap();
        let updated = update_weekly_plan(&db, stranger, theirs.id, moved).await?;
        assert_eq!(updated.week_start_date, day("2024-04-28"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_weekly_plan() -> Result<()> {
        let (db, user_id) = setup_with_user().await?;
        let plan = get_or_create_weekly_plan(&db, user_id, day("2024-05-01")).await?;

        let update = WeeklyPlanUpdate::parse(&json!({
            "focus_areas": ["Health", "Launch"],
            "notes": "Protect mornings",
            "updated_at": Utc::now().to_rfc3339()
        }))
        .unwrap();
        let updated = update_weekly_plan(&db, user_id, plan.id, update).await?;
        assert_eq!(updated.focus_areas.unwrap().0, vec!["Health", "Launch"]);
        assert_eq!(updated.notes.as_deref(), Some("Protect mornings"));
        assert_eq!(updated.week_start_date, plan.week_start_date);

        let shifted = WeeklyPlanUpdate::parse(&json!({
            "week_start_date": "2024-04-29",
            "updated_at": Utc::now().to_rfc3339()
        }))
        .unwrap();
        let errors = update_weekly_plan(&db, user_id, plan.id, shifted).await.unwrap_err();
        assert_eq!(errors.validation().unwrap().for_field("week_start_date").len(), 1);

        let stretched = WeeklyPlanUpdate::parse(&json!({
            "week_end_date": "2024-05-05",
            "updated_at": Utc::now().to_rfc3339()
        }))
        .unwrap();
        let errors = update_weekly_plan(&db, user_id, plan.id, stretched).await.unwrap_err();
        assert_eq!(errors.validation().unwrap().for_field("week_end_date").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_plan_items_ordering_and_join() -> Result<()> {
        let (db, user_id) = setup_with_user().await?;
        let plan = get_or_create_weekly_plan(&db, user_id, day("2024-05-01")).await?;

        // General priority C, planned as A for this week
        let report = create_test_task(&db, user_id, "Report", Priority::C).await?;
        let gym = create_test_task(&db, user_id, "Gym", Priority::A).await?;
        let email = create_test_task(&db, user_id, "Email", Priority::A).await?;
        let call = create_test_task(&db, user_id, "Call mum", Priority::B).await?;

        add_plan_item(&db, user_id, item(plan.id, call.id, Priority::B, None)).await?;
        add_plan_item(&db, user_id, item(plan.id, gym.id, Priority::A, None)).await?;
        add_plan_item(&db, user_id, item(plan.id, email.id, Priority::A, Some(2))).await?;
        add_plan_item(&db, user_id, item(plan.id, report.id, Priority::A, Some(1))).await?;

        let items = list_plan_items(&db, user_id, plan.id).await?;
        let titles: Vec<&str> = items
            .iter()
            .map(|i| i.task.as_ref().unwrap().title.as_str())
            .collect();
        assert_eq!(titles, vec!["Report", "Email", "Gym", "Call mum"]);
        assert_eq!(items[0].item.priority, Priority::A);
        assert_eq!(items[0].task.as_ref().unwrap().priority, Priority::C);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_plan_item_rejections() -> Result<()> {
        let (db, user_id) = setup_with_user().await?;
        let plan = get_or_create_weekly_plan(&db, user_id, day("2024-05-01")).await?;
        let task = create_test_task(&db, user_id, "Mine", Priority::A).await?;
        let foreign = create_test_task(&db, Uuid::new_v4(), "Theirs", Priority::A).await?;

        add_plan_item(&db, user_id, item(plan.id, task.id, Priority::A, None)).await?;
        let duplicate = add_plan_item(&db, user_id, item(plan.id, task.id, Priority::B, None))
            .await
            .unwrap_err();
        assert_eq!(
            duplicate.validation().unwrap().issues()[0].message,
            "Task is already in this plan"
        );

        let errors = add_plan_item(&db, user_id, item(plan.id, foreign.id, Priority::A, None))
            .await
            .unwrap_err();
        assert_eq!(errors.validation().unwrap().for_field("task_id").len(), 1);

        let intruder = Uuid::new_v4();
        assert!(matches!(
            add_plan_item(&db, intruder, item(plan.id, task.id, Priority::A, None)).await,
            Err(Error::NotFound { entity: "weekly_plan", .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_remove_plan_item() -> Result<()> {
        let (db, user_id) = setup_with_user().await?;
        let plan = get_or_create_weekly_plan(&db, user_id, day("2024-05-01")).await?;
        let task = create_test_task(&db, user_id, "Write", Priority::B).await?;
        let added = add_plan_item(&db, user_id, item(plan.id, task.id, Priority::B, None)).await?;

        let update = WeeklyPlanItemUpdate::parse(&json!({ "priority": "A", "is_mit": true })).unwrap();
        let updated = update_plan_item(&db, user_id, added.id, update).await?;
        assert_eq!(updated.priority, Priority::A);
        assert!(updated.is_mit);
        assert_eq!(updated.rank, None);

        assert!(
            update_plan_item(&db, Uuid::new_v4(), added.id, WeeklyPlanItemUpdate::default())
                .await
                .is_err()
        );

        remove_plan_item(&db, user_id, added.id).await?;
        assert!(list_plan_items(&db, user_id, plan.id).await?.is_empty());
        // The task survives its removal from the plan
        assert_eq!(crate::core::task::get_task(&db, user_id, task.id).await?.id, task.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_task_cascades_to_plan_items() -> Result<()> {
        let (db, user_id) = setup_with_user().await?;
        let plan = get_or_create_weekly_plan(&db, user_id, day("2024-05-01")).await?;
        let task = create_test_task(&db, user_id, "Temp", Priority::C).await?;
        add_plan_item(&db, user_id, item(plan.id, task.id, Priority::C, None)).await?;

        crate::core::task::delete_task(&db, user_id, task.id).await?;
        assert!(list_plan_items(&db, user_id, plan.id).await?.is_empty());
        Ok(())
    }
}
