//! Typed shapes - row, feature and account shapes built on the validation engine.

pub mod auth;
pub mod common;
pub mod database;
pub mod goals;
pub mod reviews;
pub mod tasks;

pub use common::{
    ApiError, ApiResponse, DEFAULT_TIMEZONE, GoalType, Pagination, Priority, ReviewType,
    SortDirection, TaskStatus,
};
