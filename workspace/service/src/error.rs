use thiserror::Error;
use tracing::debug;

use crate::auth::AuthError;

/// Error types for the service layer
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before anything was persisted
    #[error("Validation error: {0}")]
    Validation(String),

    /// A unique value is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller could not be authenticated or lacks the required role
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Error from file system operations
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Error from password hashing or verification
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let err = ServiceError::Validation(errors.to_string());
        debug!(?err, "Input validation failed");
        err
    }
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(error: argon2::password_hash::Error) -> Self {
        ServiceError::PasswordHash(error.to_string())
    }
}

impl ServiceError {
    /// Maps a unique-constraint violation to [`ServiceError::Conflict`], keeping
    /// every other database error as is.
    pub fn from_insert(err: sea_orm::DbErr, conflict: impl FnOnce() -> String) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                debug!("Unique constraint violated: {}", detail);
                ServiceError::Conflict(conflict())
            }
            _ => ServiceError::Database(err),
        }
    }
}

/// Type alias for Result with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
