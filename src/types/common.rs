//! Shared enumerations and reusable validators.
//!
//! The four closed enumerations (priority, goal tier, task status, review type) double as
//! SeaORM active enums, so the same Rust type is validated on input and stored as its
//! string value. Pagination and the API envelopes live here as well.

use crate::errors::Error;
use crate::schema::{ObjectSchema, Schema, Shape, boolean, enumeration, integer, object, string};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DeriveActiveEnum, EnumIter, sea_query::StringLen};
use serde::{Deserialize, Serialize};

/// Timezone assigned to profiles that do not specify one.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Coarse urgency/importance band of a task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Priority {
    /// Must do
    #[sea_orm(string_value = "A")]
    A,
    /// Should do
    #[sea_orm(string_value = "B")]
    B,
    /// Could do
    #[sea_orm(string_value = "C")]
    C,
}

impl Priority {
    /// Accepted wire values.
    pub const VALUES: &'static [&'static str] = &["A", "B", "C"];

    #[must_use]
    pub fn schema() -> Schema {
        enumeration(Self::VALUES)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }

    /// Display label used next to priority badges.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "High Priority",
            Self::B => "Medium Priority",
            Self::C => "Low Priority",
        }
    }
}

/// Tier of a goal in the life / three-year / annual / quarterly hierarchy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalType {
    #[sea_orm(string_value = "LIFE")]
    Life,
    #[sea_orm(string_value = "THREE_YEAR")]
    ThreeYear,
    #[sea_orm(string_value = "ANNUAL")]
    Annual,
    #[sea_orm(string_value = "QUARTERLY")]
    Quarterly,
}

impl GoalType {
    pub const VALUES: &'static [&'static str] = &["LIFE", "THREE_YEAR", "ANNUAL", "QUARTERLY"];

    /// All tiers, broadest first.
    pub const ALL: [Self; 4] = [Self::Life, Self::ThreeYear, Self::Annual, Self::Quarterly];

    #[must_use]
    pub fn schema() -> Schema {
        enumeration(Self::VALUES)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Life => "LIFE",
            Self::ThreeYear => "THREE_YEAR",
            Self::Annual => "ANNUAL",
            Self::Quarterly => "QUARTERLY",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Life => "Life Goal",
            Self::ThreeYear => "3-Year Goal",
            Self::Annual => "Annual Goal",
            Self::Quarterly => "Quarterly Goal",
        }
    }

    /// Depth in the hierarchy, 0 for life goals.
    #[must_use]
    pub const fn depth(self) -> u8 {
        match self {
            Self::Life => 0,
            Self::ThreeYear => 1,
            Self::Annual => 2,
            Self::Quarterly => 3,
        }
    }

    /// Whether a goal of this tier may parent a goal of `child` tier.
    #[must_use]
    pub const fn can_parent(self, child: Self) -> bool {
        self.depth() < child.depth()
    }
}

/// Lifecycle state of a task. Any value may follow any other.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl TaskStatus {
    pub const VALUES: &'static [&'static str] =
        &["PENDING", "IN_PROGRESS", "COMPLETED", "CANCELLED"];

    #[must_use]
    pub fn schema() -> Schema {
        enumeration(Self::VALUES)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Still waiting to be finished.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

/// Cadence of a periodic review.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewType {
    #[sea_orm(string_value = "WEEKLY")]
    Weekly,
    #[sea_orm(string_value = "MONTHLY")]
    Monthly,
}

impl ReviewType {
    pub const VALUES: &'static [&'static str] = &["WEEKLY", "MONTHLY"];

    #[must_use]
    pub fn schema() -> Schema {
        enumeration(Self::VALUES)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }
}

/// Ordering direction of a sort specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub const VALUES: &'static [&'static str] = &["asc", "desc"];
}

impl From<SortDirection> for sea_orm::Order {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

/// Page selection for list queries. Out-of-range values are rejected, not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: u64,
    /// Rows per page, 1 to 100
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    /// Number of rows to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Shape for Pagination {
    fn schema() -> ObjectSchema {
        object()
            .with_default("page", integer().min(1.0), 1)
            .with_default("limit", integer().min(1.0).max(100.0), 20)
    }
}

/// Success envelope wrapping an arbitrary payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Envelope schema for a payload validated by `data`.
#[must_use]
pub fn api_response_schema(data: impl Into<Schema>) -> ObjectSchema {
    object()
        .field("data", data)
        .field("success", boolean())
        .optional("message", string())
}

/// Failure envelope: machine code, human message and HTTP-style status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

static ERROR_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+(_[a-z]+)*$").expect("error code regex must compile"));

impl Shape for ApiError {
    fn schema() -> ObjectSchema {
        object()
            .field(
                "error",
                string().pattern(&ERROR_CODE_RE, "Error code must be snake_case"),
            )
            .field("message", string())
            .field("statusCode", integer().min(100.0).max(599.0))
    }
}

impl From<&Error> for ApiError {
    fn from(error: &Error) -> Self {
        let (code, status_code) = match error {
            Error::Validation(_) => ("validation_error", 400),
            Error::NotFound { .. } => ("not_found", 404),
            Error::Config { .. } => ("config_error", 500),
            Error::Database(_) => ("database_error", 500),
            Error::Io(_) => ("io_error", 500),
        };
        Self {
            error: code.to_string(),
            message: error.to_string(),
            status_code,
        }
    }
}
