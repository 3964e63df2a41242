//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a user, account, access rule or record is
//!   absent.
//! - [`Forbidden`] thrown when the access gate denies the acting user.
//! - [`Conflict`] thrown on duplicate grants, duplicate emails and attempts to
//!   revoke an owner.
//! - [`InvalidInput`] thrown when a value breaks a domain bound.
//! - [`Database`] and [`Rollback`] thrown when the store fails.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Conflict`]: EngineError::Conflict
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`Database`]: EngineError::Database
//!  [`Rollback`]: EngineError::Rollback
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Access denied: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Database(#[from] DbErr),
    /// The transaction body failed and the rollback failed too.
    #[error("{source} (rollback failed: {rollback})")]
    Rollback {
        source: Box<EngineError>,
        rollback: DbErr,
    },
}

impl EngineError {
    /// Returns `true` when the error comes from the store rather than from a
    /// domain decision.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Rollback { .. })
    }

    /// Maps a unique constraint violation to [`EngineError::Conflict`], any
    /// other store error stays a [`EngineError::Database`].
    pub(crate) fn from_insert(err: DbErr, conflict: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(conflict.to_string()),
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            (
                Self::Rollback {
                    source: a,
                    rollback: ra,
                },
                Self::Rollback {
                    source: b,
                    rollback: rb,
                },
            ) => a == b && ra.to_string() == rb.to_string(),
            _ => false,
        }
    }
}
