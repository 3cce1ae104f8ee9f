//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// SQLSTATE raised by PostgreSQL on a unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE raised by PostgreSQL on a foreign key violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

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
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Failure surfaced by a repository operation
#[derive(Error, Debug)]
pub enum RepoError {
    /// The referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// A unique field is already taken, or the row is still referenced
    #[error("{0}")]
    Conflict(String),

    /// The input passed shape validation but breaks a business rule
    #[error("{0}")]
    Invalid(String),

    /// Unexpected database failure
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),
}

/// Type alias for Result with RepoError
pub type RepoResult<T> = Result<T, RepoError>;

/// Constraint family a database error belongs to, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique,
    ForeignKey,
}

/// Classify a sqlx error by the SQLSTATE PostgreSQL attached to it
pub fn constraint_violation(err: &SqlxError) -> Option<ConstraintViolation> {
    let SqlxError::Database(db_err) = err else {
        return None;
    };
    match db_err.code().as_deref() {
        Some(UNIQUE_VIOLATION) => Some(ConstraintViolation::Unique),
        Some(FOREIGN_KEY_VIOLATION) => Some(ConstraintViolation::ForeignKey),
        _ => None,
    }
}

impl RepoError {
    pub fn not_found(entity: &str) -> Self {
        RepoError::NotFound(format!("{} not found", entity))
    }

    /// Map a failed write to `Conflict` with `message` when it tripped a
    /// unique or foreign key constraint
    pub fn conflict_or_database(err: SqlxError, message: &str) -> Self {
        match constraint_violation(&err) {
            Some(_) => RepoError::Conflict(message.to_string()),
            None => RepoError::Database(err),
        }
    }
}

impl From<SqlxError> for RepoError {
    fn from(err: SqlxError) -> Self {
        match constraint_violation(&err) {
            Some(ConstraintViolation::Unique) => {
                RepoError::Conflict("The record already exists".to_string())
            }
            Some(ConstraintViolation::ForeignKey) => {
                RepoError::Conflict("The record is referenced by other records".to_string())
            }
            None => match err {
                SqlxError::RowNotFound => RepoError::not_found("Record"),
                other => RepoError::Database(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = RepoError::from(SqlxError::RowNotFound);
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[test]
    fn non_database_errors_are_not_constraint_violations() {
        assert_eq!(constraint_violation(&SqlxError::PoolTimedOut), None);
        let err = RepoError::conflict_or_database(SqlxError::PoolTimedOut, "in use");
        assert!(matches!(err, RepoError::Database(_)));
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(RepoError::not_found("Player").to_string(), "Player not found");
    }
}
