//! Core services - user-scoped operations over the planning tables.
//!
//! Every function takes the owning user's id. Rows that belong to someone else are
//! reported as not found, never returned.

pub mod goal;
pub mod profile;
pub mod report;
pub mod review;
pub mod task;
pub mod weekly_plan;

use sea_orm::sea_query::LikeExpr;

/// `LIKE` pattern matching `term` anywhere, with `%`, `_` and `\` taken literally.
pub(crate) fn contains_literal(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

