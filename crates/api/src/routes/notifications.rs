use axum::{extract::State, http::HeaderMap, Json};
use notifyhub_database::Notification;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{util::require_bearer, ApiError, AppState};

/// Upper bound on notifications returned to a caller.
pub const NOTIFICATION_LIST_LIMIT: u32 = 100;

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i64,
    pub topic: String,
    pub release_time: String,
    pub priority: String,
    pub category: String,
    pub sent_to: Vec<String>,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id,
            topic: value.topic,
            release_time: value.release_time.to_rfc3339(),
            priority: value.priority,
            category: value.category,
            sent_to: value.sent_to,
        }
    }
}

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notifications delivered to the caller, newest first", body = [NotificationResponse]),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    let notifications = state
        .notifications()
        .list_for_recipient(&user.public_id, NOTIFICATION_LIST_LIMIT)
        .await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}
