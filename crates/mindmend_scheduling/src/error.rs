// --- File: crates/mindmend_scheduling/src/error.rs ---
use mindmend_common::{BoxedError, MindmendError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Invalid slot query: {0}")]
    InvalidQuery(String),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("Refund amount must not be negative: {0}")]
    InvalidAmount(i64),
    #[error("Invalid refund policy: {0}")]
    InvalidPolicy(String),
    #[error("Store error: {0}")]
    Store(#[from] BoxedError),
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<SchedulingError> for MindmendError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidQuery(_)
            | SchedulingError::TimeParseError(_)
            | SchedulingError::InvalidAmount(_) => MindmendError::ValidationError(err.to_string()),
            SchedulingError::InvalidPolicy(_) => MindmendError::ConfigError(err.to_string()),
            SchedulingError::Store(_) | SchedulingError::LockPoisoned => {
                MindmendError::DatabaseError(err.to_string())
            }
        }
    }
}
