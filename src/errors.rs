//! Unified error types and result handling.

use crate::schema::ValidationErrors;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Input failed its schema; every violation is listed.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// The row does not exist or belongs to another user.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// The validation issues, if this is a validation failure.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
