//! Error types for the database client

use mindmend_common::{BoxedError, MindmendError};
use thiserror::Error;

/// Errors that can occur when working with the schedule database
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A stored row could not be mapped back to a model
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

impl From<DbError> for BoxedError {
    fn from(err: DbError) -> Self {
        BoxedError::new(err)
    }
}

impl From<DbError> for MindmendError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigError(_) | DbError::UrlError(_) => {
                MindmendError::ConfigError(err.to_string())
            }
            _ => MindmendError::DatabaseError(err.to_string()),
        }
    }
}
