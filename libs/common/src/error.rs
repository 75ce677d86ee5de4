//! Custom error types for the common library
//!
//! This module defines the store-level error type shared by the auth and
//! api services. Constraint violations are classified so the services can
//! turn them into domain outcomes instead of generic backend faults.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// A foreign key pointed at a row that no longer exists
    #[error("Referenced row is missing: {0}")]
    MissingReference(String),
}

impl DatabaseError {
    /// Classify an error returned while executing a query
    pub fn from_query(error: SqlxError) -> Self {
        if let Some(db_error) = error.as_database_error() {
            let constraint = db_error.constraint().unwrap_or("unknown").to_string();
            if db_error.is_unique_violation() {
                return DatabaseError::Conflict(constraint);
            }
            if db_error.is_foreign_key_violation() {
                return DatabaseError::MissingReference(constraint);
            }
        }
        DatabaseError::Query(error)
    }

    /// True when the error came from a unique constraint
    pub fn is_conflict(&self) -> bool {
        matches!(self, DatabaseError::Conflict(_))
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
