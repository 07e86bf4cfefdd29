//! Error taxonomy for the persistence core.
//!
//! Every variant is an input or constraint failure scoped to a single
//! operation; callers surface them synchronously and never retry.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A field failed write-time validation (email syntax, password length,
    /// unknown notification type, out-of-bounds string).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A unique column (primary key, student id) would be duplicated.
    #[error("Uniqueness violation: {0}")]
    Uniqueness(String),

    /// A NOT NULL foreign key points at a row that does not exist.
    /// Nullable references never raise this; they fail open to null.
    #[error("Broken reference: {0}")]
    Reference(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
