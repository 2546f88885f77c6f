//! Review input, filter, insight and statistics shapes.

use super::common::{ReviewType, SortDirection};
use super::database::{ReviewInsert, ReviewUpdate};
use crate::schema::{
    ArraySchema, ObjectSchema, Shape, array, date, date_time, enumeration, integer, number,
    object, string, uuid,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cap on entries in each free-text review list.
pub const MAX_REVIEW_ENTRIES: usize = 10;

fn entries() -> ArraySchema {
    array(string().min(1)).max(MAX_REVIEW_ENTRIES)
}

fn score() -> crate::schema::NumberSchema {
    integer().min(1.0).max(10.0)
}

fn create_review_schema() -> ObjectSchema {
    object()
        .field("type", ReviewType::schema())
        .field("period_start", date())
        .field("period_end", date())
        .optional("accomplishments", entries())
        .optional("challenges", entries())
        .optional("lessons_learned", entries())
        .optional("next_period_focus", entries())
        .optional("satisfaction_score", score())
        .optional("notes", string().max(2000))
}

/// User input for a new review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReview {
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

impl Shape for CreateReview {
    fn schema() -> ObjectSchema {
        create_review_schema()
    }
}

impl CreateReview {
    #[must_use]
    pub fn into_insert(self, user_id: Uuid) -> ReviewInsert {
        ReviewInsert {
            user_id,
            review_type: self.review_type,
            period_start: self.period_start,
            period_end: self.period_end,
            accomplishments: self.accomplishments,
            challenges: self.challenges,
            lessons_learned: self.lessons_learned,
            next_period_focus: self.next_period_focus,
            satisfaction_score: self.satisfaction_score,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReview {
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
}

impl Shape for UpdateReview {
    fn schema() -> ObjectSchema {
        create_review_schema().partial()
    }
}

impl UpdateReview {
    #[must_use]
    pub fn into_update(self, now: DateTime<Utc>) -> ReviewUpdate {
        ReviewUpdate {
            review_type: self.review_type,
            period_start: self.period_start,
            period_end: self.period_end,
            accomplishments: self.accomplishments,
            challenges: self.challenges,
            lessons_learned: self.lessons_learned,
            next_period_focus: self.next_period_focus,
            satisfaction_score: self.satisfaction_score,
            notes: self.notes,
            updated_at: now,
        }
    }
}

/// Direction satisfaction has moved across recent reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatisfactionTrend {
    Improving,
    Declining,
    Stable,
}

impl SatisfactionTrend {
    pub const VALUES: &'static [&'static str] = &["improving", "declining", "stable"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityIndicators {
    pub task_completion_rate: f64,
    pub mit_success_rate: f64,
    pub goal_progress_rate: f64,
}

/// Derived observations about one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewInsights {
    pub review_id: Uuid,
    pub satisfaction_trend: SatisfactionTrend,
    pub common_challenges: Vec<String>,
    pub recurring_themes: Vec<String>,
    pub goal_alignment_score: f64,
    pub productivity_indicators: ProductivityIndicators,
}

impl Shape for ReviewInsights {
    fn schema() -> ObjectSchema {
        let percent = || number().min(0.0).max(100.0);
        object()
            .field("review_id", uuid())
            .field(
                "satisfaction_trend",
                enumeration(SatisfactionTrend::VALUES),
            )
            .field("common_challenges", array(string()))
            .field("recurring_themes", array(string()))
            .field("goal_alignment_score", percent())
            .field(
                "productivity_indicators",
                object()
                    .field("task_completion_rate", percent())
                    .field("mit_success_rate", percent())
                    .field("goal_progress_rate", percent()),
            )
    }
}

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionRange {
    pub min: i32,
    pub max: i32,
}

/// Sparse predicates for listing reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFilters {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub review_type: Option<ReviewType>,
    /// Period start falls inside the window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_range: Option<SatisfactionRange>,
}

impl Shape for ReviewFilters {
    fn schema() -> ObjectSchema {
        object()
            .optional("type", ReviewType::schema())
            .optional(
                "date_range",
                object().field("start", date()).field("end", date()),
            )
            .optional(
                "satisfaction_range",
                object().field("min", score()).field("max", score()),
            )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSortField {
    CreatedAt,
    #[default]
    PeriodStart,
    SatisfactionScore,
}

impl ReviewSortField {
    pub const VALUES: &'static [&'static str] = &["created_at", "period_start", "satisfaction_score"];
}

/// Sort order for review listings, latest period first by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSort {
    pub field: ReviewSortField,
    pub direction: SortDirection,
}

impl Shape for ReviewSort {
    fn schema() -> ObjectSchema {
        object()
            .with_default("field", enumeration(ReviewSortField::VALUES), "period_start")
            .with_default("direction", enumeration(SortDirection::VALUES), "desc")
    }
}

/// Aggregate review history of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total_reviews: u64,
    pub weekly_reviews: u64,
    pub monthly_reviews: u64,
    /// Mean of the recorded scores, 0 when none were recorded
    pub average_satisfaction: f64,
    /// Consecutive weeks with a weekly review, counted back from this week or the last
    pub completion_streak: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_due: Option<DateTime<Utc>>,
}

impl Shape for ReviewStats {
    fn schema() -> ObjectSchema {
        object()
            .field("total_reviews", integer().min(0.0))
            .field("weekly_reviews", integer().min(0.0))
            .field("monthly_reviews", integer().min(0.0))
            .field("average_satisfaction", number().min(0.0).max(10.0))
            .field("completion_streak", integer().min(0.0))
            .optional("last_review_date", date_time())
            .optional("next_review_due", date_time())
    }
}

/// Calendar span a review covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(rename = "type")]
    pub review_type: ReviewType,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::schema::IssueCode;
    use serde_json::json;

    #[test]
    fn test_create_review_valid() {
        let review = CreateReview::parse(&json!({
            "type": "WEEKLY",
            "period_start": "2024-04-28",
            "period_end": "2024-05-04",
            "accomplishments": ["Finished the report", "Ran 20km"],
            "satisfaction_score": 8
        }))
        .unwrap();
        assert_eq!(review.review_type, ReviewType::Weekly);
        assert_eq!(review.accomplishments.as_ref().unwrap().len(), 2);
        assert_eq!(review.challenges, None);
    }

    #[test]
    fn test_create_review_entry_limits() {
        let eleven: Vec<String> = (0..11).map(|i| format!("entry {i}")).collect();
        let errors = CreateReview::parse(&json!({
            "type": "MONTHLY",
            "period_start": "2024-04-01",
            "period_end": "2024-04-30",
            "challenges": eleven,
            "lessons_learned": ["ok", ""],
            "satisfaction_score": 11
        }))
        .unwrap_err();
        assert_eq!(errors.for_field("challenges")[0].code, IssueCode::TooBig);
        assert_eq!(errors.for_field("lessons_learned[1]")[0].code, IssueCode::TooSmall);
        assert_eq!(errors.for_field("satisfaction_score").len(), 1);
    }

    #[test]
    fn test_review_period_date_format() {
        let errors = CreateReview::parse(&json!({
            "type": "WEEKLY",
            "period_start": "2024/04/28",
            "period_end": "2024-02-30"
        }))
        .unwrap_err();
        assert_eq!(errors.for_field("period_start")[0].message, "Invalid date format");
        assert_eq!(errors.for_field("period_end")[0].message, "Invalid calendar date");
    }

    #[test]
    fn test_update_review_is_partial() {
        assert_eq!(UpdateReview::parse(&json!({})).unwrap(), UpdateReview::default());
        let update = UpdateReview::parse(&json!({ "notes": "Good week" })).unwrap();
        let stamped = update.into_update(Utc::now());
        assert_eq!(stamped.notes.as_deref(), Some("Good week"));
    }

    #[test]
    fn test_review_sort_defaults() {
        let sort = ReviewSort::parse(&json!({})).unwrap();
        assert_eq!(sort.field, ReviewSortField::PeriodStart);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_review_filters_ranges() {
        let filters = ReviewFilters::parse(&json!({
            "type": "MONTHLY",
            "satisfaction_range": { "min": 5, "max": 10 }
        }))
        .unwrap();
        assert_eq!(filters.satisfaction_range, Some(SatisfactionRange { min: 5, max: 10 }));

        let errors = ReviewFilters::parse(&json!({
            "satisfaction_range": { "min": 0, "max": 10 }
        }))
        .unwrap_err();
        assert_eq!(errors.issues()[0].path.to_string(), "satisfaction_range.min");
    }

    #[test]
    fn test_review_insights_trend_values() {
        let base = json!({
            "review_id": Uuid::new_v4().to_string(),
            "satisfaction_trend": "improving",
            "common_challenges": [],
            "recurring_themes": ["focus"],
            "goal_alignment_score": 72.5,
            "productivity_indicators": {
                "task_completion_rate": 80,
                "mit_success_rate": 66.7,
                "goal_progress_rate": 40
            }
        });
        let insights = ReviewInsights::parse(&base).unwrap();
        assert_eq!(insights.satisfaction_trend, SatisfactionTrend::Improving);

        let mut bad = base;
        bad["satisfaction_trend"] = json!("flat");
        assert!(ReviewInsights::parse(&bad).is_err());
    }
}
