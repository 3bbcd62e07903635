//! User repository for database operations.

use crate::entities::{CreateUserRequest, PreferenceFilter, Preferences, User};
use crate::types::{UserError, UserResult};
use chrono::Utc;
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

const USER_COLUMNS: &str =
    "id, public_id, email, password_hash, subscribed, preferences, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Create a new, subscribed user.
    ///
    /// Fails with [`UserError::EmailAlreadyExists`] when the email is taken.
    /// Uniqueness is enforced by the `users.email` constraint.
    pub async fn create(&self, request: &CreateUserRequest) -> UserResult<User> {
        let now = Utc::now().to_rfc3339();
        let public_id = CUID.create_id();
        let preferences = serde_json::to_string(&request.preferences)?;

        let result = sqlx::query(
            "INSERT INTO users (public_id, email, password_hash, subscribed, preferences, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(true)
        .bind(&preferences)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let user_id = result.last_insert_rowid();
        self.find_by_id(user_id).await?.ok_or(UserError::UserNotFound)
    }

    /// Set the subscribed flag
    pub async fn set_subscribed(&self, id: i64, subscribed: bool) -> UserResult<()> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query("UPDATE users SET subscribed = ?, updated_at = ? WHERE id = ?")
            .bind(subscribed)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }

    /// Replace the stored preferences wholesale
    pub async fn update_preferences(&self, id: i64, preferences: &Preferences) -> UserResult<User> {
        let now = Utc::now().to_rfc3339();
        let encoded = serde_json::to_string(preferences)?;

        let result = sqlx::query("UPDATE users SET preferences = ?, updated_at = ? WHERE id = ?")
            .bind(&encoded)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        self.find_by_id(id).await?.ok_or(UserError::UserNotFound)
    }

    /// Count users with the subscribed flag set
    pub async fn count_subscribed(&self) -> UserResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE subscribed = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Subscribed users whose preference lists satisfy every clause of `filter`.
    ///
    /// Each clause becomes a `json_each` membership test on the stored
    /// preferences document, so an absent list never matches.
    pub async fn find_subscribed_matching(&self, filter: &PreferenceFilter) -> UserResult<Vec<User>> {
        let mut sql = format!("SELECT {USER_COLUMNS} FROM users WHERE subscribed = 1");
        for (field, _) in filter.clauses() {
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM json_each(users.preferences, '{}') AS pref WHERE pref.value = ?)",
                field.json_path()
            ));
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query(&sql);
        for (_, value) in filter.clauses() {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }

    /// List users in creation order
    pub async fn list(&self, limit: u32) -> UserResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ?"))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }
}

fn user_from_row(row: &SqliteRow) -> UserResult<User> {
    let preferences: String = row.try_get("preferences")?;

    Ok(User {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        subscribed: row.try_get("subscribed")?,
        preferences: serde_json::from_str(&preferences)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
