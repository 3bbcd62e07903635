//! NotifyHub Database Crate
//!
//! Connection management, migrations, and the repositories backing the
//! subscriber and notification stores.

use notifyhub_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{NotificationRepository, UserRepository};

pub use entities::{
    CreateNotificationRequest, CreateUserRequest, Notification, PreferenceField,
    PreferenceFilter, Preferences, User,
};

pub use types::{
    DatabaseError, DatabaseResult, NotificationError, NotificationResult, UserError, UserResult,
};

pub use sqlx::SqlitePool;

/// Connect to the configured database and bring its schema up to date
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
