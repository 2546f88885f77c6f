//! Review business logic - weekly and monthly reflections and their statistics.

use crate::{
    catalog::unanswered_required_prompts,
    core::weekly_plan::week_bounds,
    entities::{Review, review},
    errors::{Error, Result},
    schema::{FieldPath, IssueCode, ValidationErrors},
    types::{
        Pagination, ReviewType,
        reviews::{
            CreateReview, ReviewFilters, ReviewPeriod, ReviewSort, ReviewSortField, ReviewStats,
            UpdateReview,
        },
    },
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{IntoActiveModel, Order, QueryOrder, QuerySelect, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info};

fn check_period(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(ValidationErrors::single(
            FieldPath::root().key("period_end"),
            IssueCode::Custom,
            "Period end must not be before its start",
        )
        .into());
    }
    Ok(())
}

fn log_unanswered(review: &review::Model) {
    let unanswered = unanswered_required_prompts(review);
    if !unanswered.is_empty() {
        let ids: Vec<&str> = unanswered.iter().map(|p| p.id).collect();
        debug!(review_id = %review.id, ?ids, "Review leaves required prompts unanswered");
    }
}

/// The period a new review of `review_type` would cover on `today`.
///
/// Weekly reviews cover the Sunday-to-Saturday week; monthly reviews the calendar month.
#[must_use]
pub fn current_period(review_type: ReviewType, today: NaiveDate) -> ReviewPeriod {
    let (start, end) = match review_type {
        ReviewType::Weekly => week_bounds(today),
        ReviewType::Monthly => {
            let start = today.with_day(1).unwrap_or(today);
            let next_month = if start.month() == 12 {
                NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
            };
            let end = next_month.map_or(today, |d| d - Duration::days(1));
            (start, end)
        }
    };
    ReviewPeriod {
        start,
        end,
        review_type,
    }
}

/// Records a review. Required prompts left blank are logged, not rejected.
pub async fn create_review(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: CreateReview,
) -> Result<review::Model> {
    check_period(input.period_start, input.period_end)?;

    let review = input
        .into_insert(user_id)
        .into_active_model(Utc::now())
        .insert(db)
        .await?;
    log_unanswered(&review);

    info!(
        %user_id,
        review_type = review.review_type.as_str(),
        period_start = %review.period_start,
        "Recorded review"
    );
    Ok(review)
}

pub async fn get_review(
    db: &DatabaseConnection,
    user_id: Uuid,
    review_id: Uuid,
) -> Result<review::Model> {
    Review::find_by_id(review_id)
        .filter(review::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("review", review_id))
}

pub async fn update_review(
    db: &DatabaseConnection,
    user_id: Uuid,
    review_id: Uuid,
    input: UpdateReview,
) -> Result<review::Model> {
    let existing = get_review(db, user_id, review_id).await?;
    check_period(
        input.period_start.unwrap_or(existing.period_start),
        input.period_end.unwrap_or(existing.period_end),
    )?;

    let mut active = existing.into_active_model();
    input.into_update(Utc::now()).apply_to(&mut active);
    let review = active.update(db).await?;
    log_unanswered(&review);
    Ok(review)
}

/// Lists the user's reviews matching `filters`.
///
/// `date_range` selects on the period start; `satisfaction_range` only matches scored reviews.
pub async fn list_reviews(
    db: &DatabaseConnection,
    user_id: Uuid,
    filters: &ReviewFilters,
    sort: ReviewSort,
    page: Pagination,
) -> Result<Vec<review::Model>> {
    let mut query = Review::find().filter(review::Column::UserId.eq(user_id));

    if let Some(review_type) = filters.review_type {
        query = query.filter(review::Column::ReviewType.eq(review_type));
    }
    if let Some(range) = filters.date_range {
        query = query.filter(review::Column::PeriodStart.between(range.start, range.end));
    }
    if let Some(range) = filters.satisfaction_range {
        query = query.filter(review::Column::SatisfactionScore.between(range.min, range.max));
    }

    let column = match sort.field {
        ReviewSortField::CreatedAt => review::Column::CreatedAt,
        ReviewSortField::PeriodStart => review::Column::PeriodStart,
        ReviewSortField::SatisfactionScore => review::Column::SatisfactionScore,
    };

    query
        .order_by(column, Order::from(sort.direction))
        .order_by_asc(review::Column::Id)
        .offset(page.offset())
        .limit(page.limit)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn delete_review(db: &DatabaseConnection, user_id: Uuid, review_id: Uuid) -> Result<()> {
    let review = get_review(db, user_id, review_id).await?;
    Review::delete_by_id(review.id).exec(db).await?;
    info!(%user_id, %review_id, "Deleted review");
    Ok(())
}

/// Weeks in an unbroken run of weekly reviews.
///
/// The run may end this week or last week; a week is covered when a weekly review's
/// period starts inside it.
fn weekly_streak(week_starts: &HashSet<NaiveDate>, today: NaiveDate) -> u64 {
    let (this_week, _) = week_bounds(today);
    let mut cursor = if week_starts.contains(&this_week) {
        this_week
    } else {
        this_week - Duration::days(7)
    };

    let mut streak = 0;
    while week_starts.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(7);
    }
    streak
}

/// Review history summary for `user_id` as of `today`.
///
/// The next review is due at the end of the week after the latest weekly review, or at
/// the end of the current week when no weekly review exists yet.
pub async fn review_stats(
    db: &DatabaseConnection,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<ReviewStats> {
    let reviews = Review::find()
        .filter(review::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    let weekly: Vec<&review::Model> = reviews
        .iter()
        .filter(|r| r.review_type == ReviewType::Weekly)
        .collect();
    let scores: Vec<i32> = reviews.iter().filter_map(|r| r.satisfaction_score).collect();

    #[allow(clippy::cast_precision_loss)]
    let average_satisfaction = if scores.is_empty() {
        0.0
    } else {
        let mean = scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    let week_starts: HashSet<NaiveDate> =
        weekly.iter().map(|r| week_bounds(r.period_start).0).collect();

    let due_week_end = weekly
        .iter()
        .map(|r| r.period_start)
        .max()
        .map_or_else(
            || week_bounds(today).1,
            |latest| week_bounds(latest).1 + Duration::days(7),
        );

    let total = reviews.len() as u64;
    let weekly_count = weekly.len() as u64;
    Ok(ReviewStats {
        total_reviews: total,
        weekly_reviews: weekly_count,
        monthly_reviews: total - weekly_count,
        average_satisfaction,
        completion_streak: weekly_streak(&week_starts, today),
        last_review_date: reviews.iter().map(|r| r.created_at).max(),
        next_review_due: Some(due_week_end.and_time(NaiveTime::MIN).and_utc()),
    })
}
