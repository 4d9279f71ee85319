use std::fmt;
use thiserror::Error;

/// The base error type for all MindMend errors.
///
/// Crate-specific errors convert into this type at the HTTP boundary.
#[derive(Error, Debug)]
pub enum MindmendError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for MindmendError {
    fn status_code(&self) -> u16 {
        match self {
            MindmendError::ParseError(_) => 400,
            MindmendError::ConfigError(_) => 500,
            MindmendError::ValidationError(_) => 400,
            MindmendError::DatabaseError(_) => 500,
            MindmendError::NotFoundError(_) => 404,
            MindmendError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for MindmendError {
    fn from(err: serde_json::Error) -> Self {
        MindmendError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> MindmendError {
    MindmendError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> MindmendError {
    MindmendError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> MindmendError {
    MindmendError::NotFoundError(message.to_string())
}

pub fn database_error<T: fmt::Display>(message: T) -> MindmendError {
    MindmendError::DatabaseError(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> MindmendError {
    MindmendError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error("bad date").status_code(), 400);
        assert_eq!(not_found("appointment").status_code(), 404);
        assert_eq!(database_error("pool closed").status_code(), 500);
        assert_eq!(config_error("no db").status_code(), 500);
    }

    #[test]
    fn test_display_includes_message() {
        let err = validation_error("session_duration must be one of 30, 60");
        assert_eq!(
            err.to_string(),
            "Validation error: session_duration must be one of 30, 60"
        );
    }
}
