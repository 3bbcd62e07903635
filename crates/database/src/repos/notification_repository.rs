//! Notification repository for database operations.

use crate::entities::{CreateNotificationRequest, Notification};
use crate::types::{NotificationError, NotificationResult};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const NOTIFICATION_SELECT: &str = "SELECT n.id, n.topic, n.release_time, n.priority, n.category,
        (SELECT json_group_array(recipient_id) FROM (
            SELECT recipient_id FROM notification_recipients
            WHERE notification_id = n.id ORDER BY position
        )) AS sent_to
     FROM notifications n";

/// Repository for notification database operations
#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Create a new notification repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a notification together with its ordered recipient list.
    pub async fn create(&self, request: &CreateNotificationRequest) -> NotificationResult<Notification> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO notifications (topic, release_time, priority, category, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&request.topic)
        .bind(request.release_time.to_rfc3339())
        .bind(&request.priority)
        .bind(&request.category)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let notification_id = result.last_insert_rowid();

        for (position, recipient) in request.sent_to.iter().enumerate() {
            sqlx::query(
                "INSERT INTO notification_recipients (notification_id, position, recipient_id) VALUES (?, ?, ?)",
            )
            .bind(notification_id)
            .bind(position as i64)
            .bind(recipient)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_by_id(notification_id)
            .await?
            .ok_or(NotificationError::NotificationNotFound)
    }

    /// Find notification by ID
    pub async fn find_by_id(&self, id: i64) -> NotificationResult<Option<Notification>> {
        let row = sqlx::query(&format!("{NOTIFICATION_SELECT} WHERE n.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(notification_from_row).transpose()
    }

    /// Notifications delivered to `recipient_id`, newest first
    pub async fn list_for_recipient(
        &self,
        recipient_id: &str,
        limit: u32,
    ) -> NotificationResult<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "{NOTIFICATION_SELECT}
             WHERE EXISTS (
                SELECT 1 FROM notification_recipients r
                WHERE r.notification_id = n.id AND r.recipient_id = ?
             )
             ORDER BY n.id DESC LIMIT ?"
        ))
        .bind(recipient_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(notification_from_row).collect()
    }

    /// Most recent notifications regardless of recipient
    pub async fn list_recent(&self, limit: u32) -> NotificationResult<Vec<Notification>> {
        let rows = sqlx::query(&format!("{NOTIFICATION_SELECT} ORDER BY n.id DESC LIMIT ?"))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(notification_from_row).collect()
    }
}

fn notification_from_row(row: &SqliteRow) -> NotificationResult<Notification> {
    let release_time: String = row.try_get("release_time")?;
    let release_time = DateTime::parse_from_rfc3339(&release_time)?.with_timezone(&Utc);
    let sent_to: String = row.try_get("sent_to")?;

    Ok(Notification {
        id: row.try_get("id")?,
        topic: row.try_get("topic")?,
        release_time,
        priority: row.try_get("priority")?,
        category: row.try_get("category")?,
        sent_to: serde_json::from_str(&sent_to)?,
    })
}
