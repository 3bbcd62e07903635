//! Error types for the database layer

use thiserror::Error;

/// Failure to open or migrate the store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection error: {0}")]
    ConnectionError(String),

    #[error("database migration error: {0}")]
    MigrationError(String),
}

/// Errors raised by the subscriber store
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    UserNotFound,

    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("stored preferences are malformed: {0}")]
    Preferences(#[from] serde_json::Error),

    #[error("user query failed: {0}")]
    Query(sqlx::Error),
}

/// Errors raised by the notification store
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification not found")]
    NotificationNotFound,

    #[error("stored notification is malformed: {0}")]
    Malformed(String),

    #[error("notification query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => UserError::UserNotFound,
            sqlx::Error::Database(ref db_err)
                if db_err.is_unique_violation() && db_err.message().contains("users.email") =>
            {
                UserError::EmailAlreadyExists
            }
            other => UserError::Query(other),
        }
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Malformed(err.to_string())
    }
}

impl From<chrono::ParseError> for NotificationError {
    fn from(err: chrono::ParseError) -> Self {
        NotificationError::Malformed(format!("release_time: {err}"))
    }
}
