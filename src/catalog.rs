//! Static reference data used to pre-fill goal, task and review forms.
//!
//! Nothing here is computed or persisted. Tier limits are advisory: the dashboard compares
//! counts against them but no write is ever rejected for exceeding one.

use crate::entities::{StringList, review};
use crate::types::common::{GoalType, Priority, ReviewType};
use serde::Serialize;

/// Suggested maximum number of goals per tier.
#[must_use]
pub const fn goal_limit(goal_type: GoalType) -> usize {
    match goal_type {
        GoalType::Life => 3,
        GoalType::ThreeYear => 10,
        GoalType::Annual => 5,
        GoalType::Quarterly => 20,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub category: &'static str,
    pub is_popular: bool,
}

pub const GOAL_TEMPLATES: &[GoalTemplate] = &[
    GoalTemplate {
        id: "health-fitness",
        title: "Improve Physical Health",
        description: "Focus on exercise, nutrition, and overall wellness",
        goal_type: GoalType::Annual,
        category: "Health",
        is_popular: true,
    },
    GoalTemplate {
        id: "career-growth",
        title: "Advance Career",
        description: "Develop skills, seek promotions, or change careers",
        goal_type: GoalType::Annual,
        category: "Career",
        is_popular: true,
    },
    GoalTemplate {
        id: "financial-security",
        title: "Build Financial Security",
        description: "Save money, invest, and plan for the future",
        goal_type: GoalType::ThreeYear,
        category: "Finance",
        is_popular: true,
    },
    GoalTemplate {
        id: "relationships",
        title: "Strengthen Relationships",
        description: "Spend quality time with family and friends",
        goal_type: GoalType::Life,
        category: "Relationships",
        is_popular: true,
    },
    GoalTemplate {
        id: "learning",
        title: "Learn New Skills",
        description: "Acquire knowledge and develop new competencies",
        goal_type: GoalType::Annual,
        category: "Education",
        is_popular: false,
    },
];

/// Templates shown first during onboarding.
pub fn popular_goal_templates() -> impl Iterator<Item = &'static GoalTemplate> {
    GOAL_TEMPLATES.iter().filter(|t| t.is_popular)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub priority: Priority,
    pub estimated_minutes: i32,
    pub category: &'static str,
    pub tags: &'static [&'static str],
}

pub const TASK_TEMPLATES: &[TaskTemplate] = &[
    TaskTemplate {
        id: "email-check",
        title: "Check and respond to emails",
        description: "Process inbox and respond to important messages",
        priority: Priority::B,
        estimated_minutes: 30,
        category: "Communication",
        tags: &["daily", "communication"],
    },
    TaskTemplate {
        id: "weekly-review",
        title: "Weekly review and planning",
        description: "Review past week and plan upcoming week",
        priority: Priority::A,
        estimated_minutes: 60,
        category: "Planning",
        tags: &["weekly", "review", "planning"],
    },
    TaskTemplate {
        id: "exercise",
        title: "Exercise/Physical activity",
        description: "Engage in physical exercise or activity",
        priority: Priority::A,
        estimated_minutes: 45,
        category: "Health",
        tags: &["daily", "health", "exercise"],
    },
    TaskTemplate {
        id: "reading",
        title: "Read for learning/development",
        description: "Read books, articles, or educational content",
        priority: Priority::B,
        estimated_minutes: 30,
        category: "Learning",
        tags: &["learning", "development"],
    },
];

/// Free-text list of a review that a prompt's answer goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptCategory {
    Accomplishments,
    Challenges,
    LessonsLearned,
    NextPeriodFocus,
}

impl PromptCategory {
    /// The list this category fills on a stored review.
    #[must_use]
    pub const fn entries(self, review: &review::Model) -> Option<&StringList> {
        match self {
            Self::Accomplishments => review.accomplishments.as_ref(),
            Self::Challenges => review.challenges.as_ref(),
            Self::LessonsLearned => review.lessons_learned.as_ref(),
            Self::NextPeriodFocus => review.next_period_focus.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPrompt {
    pub id: &'static str,
    pub question: &'static str,
    pub category: PromptCategory,
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub is_required: bool,
}

const fn prompt(
    id: &'static str,
    question: &'static str,
    category: PromptCategory,
    review_type: ReviewType,
    is_required: bool,
) -> ReviewPrompt {
    ReviewPrompt {
        id,
        question,
        category,
        review_type,
        is_required,
    }
}

pub const WEEKLY_REVIEW_PROMPTS: &[ReviewPrompt] = &[
    prompt(
        "weekly-accomplishments-1",
        "What were your biggest wins this week?",
        PromptCategory::Accomplishments,
        ReviewType::Weekly,
        true,
    ),
    prompt(
        "weekly-accomplishments-2",
        "Which goals did you make progress on?",
        PromptCategory::Accomplishments,
        ReviewType::Weekly,
        false,
    ),
    prompt(
        "weekly-challenges-1",
        "What obstacles did you encounter?",
        PromptCategory::Challenges,
        ReviewType::Weekly,
        true,
    ),
    prompt(
        "weekly-challenges-2",
        "What took longer than expected?",
        PromptCategory::Challenges,
        ReviewType::Weekly,
        false,
    ),
    prompt(
        "weekly-lessons-1",
        "What did you learn about yourself this week?",
        PromptCategory::LessonsLearned,
        ReviewType::Weekly,
        true,
    ),
    prompt(
        "weekly-lessons-2",
        "What would you do differently?",
        PromptCategory::LessonsLearned,
        ReviewType::Weekly,
        false,
    ),
    prompt(
        "weekly-focus-1",
        "What are your top 3 priorities for next week?",
        PromptCategory::NextPeriodFocus,
        ReviewType::Weekly,
        true,
    ),
];

pub const MONTHLY_REVIEW_PROMPTS: &[ReviewPrompt] = &[
    prompt(
        "monthly-accomplishments-1",
        "What were your major achievements this month?",
        PromptCategory::Accomplishments,
        ReviewType::Monthly,
        true,
    ),
    prompt(
        "monthly-accomplishments-2",
        "Which annual goals did you advance?",
        PromptCategory::Accomplishments,
        ReviewType::Monthly,
        false,
    ),
    prompt(
        "monthly-challenges-1",
        "What were the biggest challenges you faced?",
        PromptCategory::Challenges,
        ReviewType::Monthly,
        true,
    ),
    prompt(
        "monthly-challenges-2",
        "What patterns of difficulty emerged?",
        PromptCategory::Challenges,
        ReviewType::Monthly,
        false,
    ),
    prompt(
        "monthly-lessons-1",
        "What important insights did you gain?",
        PromptCategory::LessonsLearned,
        ReviewType::Monthly,
        true,
    ),
    prompt(
        "monthly-lessons-2",
        "How has your approach to time management evolved?",
        PromptCategory::LessonsLearned,
        ReviewType::Monthly,
        false,
    ),
    prompt(
        "monthly-focus-1",
        "What are your key focus areas for next month?",
        PromptCategory::NextPeriodFocus,
        ReviewType::Monthly,
        true,
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewTemplate {
    pub prompts: &'static [ReviewPrompt],
    pub estimated_minutes: u32,
    pub description: &'static str,
}

pub const REVIEW_TEMPLATES: &[ReviewTemplate] = &[
    ReviewTemplate {
        prompts: WEEKLY_REVIEW_PROMPTS,
        estimated_minutes: 15,
        description: "A quick weekly reflection to assess progress and plan ahead",
    },
    ReviewTemplate {
        prompts: MONTHLY_REVIEW_PROMPTS,
        estimated_minutes: 30,
        description: "A comprehensive monthly review to evaluate goals and adjust strategy",
    },
];

#[must_use]
pub const fn review_template(review_type: ReviewType) -> &'static ReviewTemplate {
    match review_type {
        ReviewType::Weekly => &REVIEW_TEMPLATES[0],
        ReviewType::Monthly => &REVIEW_TEMPLATES[1],
    }
}

/// Required prompts whose category list is missing or empty on `review`.
///
/// Advisory only: reviews are stored whether or not this is empty.
#[must_use]
pub fn unanswered_required_prompts(review: &review::Model) -> Vec<&'static ReviewPrompt> {
    review_template(review.review_type)
        .prompts
        .iter()
        .filter(|p| p.is_required)
        .filter(|p| p.category.entries(review).is_none_or(StringList::is_empty))
        .collect()
}
