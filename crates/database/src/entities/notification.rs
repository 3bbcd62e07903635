//! Notification entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub topic: String,
    pub release_time: DateTime<Utc>,
    pub priority: String,
    pub category: String,
    /// Public ids of the users the notification was fanned out to.
    pub sent_to: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub topic: String,
    pub release_time: DateTime<Utc>,
    pub priority: String,
    pub category: String,
    pub sent_to: Vec<String>,
}
