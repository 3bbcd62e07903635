use axum::{extract::State, http::HeaderMap, Json};
use notifyhub_database::Preferences;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::{util::require_bearer, ApiError, AppState};

/// Preference lists as exchanged over the API. Omitted lists are empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PreferencesBody {
    pub topic: Vec<String>,
    pub release_time: Vec<String>,
    pub priority: Vec<String>,
    pub category: Vec<String>,
}

impl From<PreferencesBody> for Preferences {
    fn from(value: PreferencesBody) -> Self {
        Self {
            topic: value.topic,
            release_time: value.release_time,
            priority: value.priority,
            category: value.category,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub preferences: PreferencesBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub subscribers: i64,
}

#[utoipa::path(
    post,
    path = "/subscribe",
    tag = "Subscriptions",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscriber registered", body = MessageResponse),
        (status = 400, description = "Malformed email or empty password", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .authenticator()
        .subscribe(&payload.email, &payload.password, payload.preferences.into())
        .await?;

    Ok(MessageResponse::new("Subscribed successfully"))
}

#[utoipa::path(
    post,
    path = "/unsubscribe",
    tag = "Subscriptions",
    responses(
        (status = 200, description = "Caller unsubscribed", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    state.users().set_subscribed(user.id, false).await?;
    info!(user_id = user.id, "subscriber unsubscribed");

    Ok(MessageResponse::new("Unsubscribed successfully"))
}

#[utoipa::path(
    post,
    path = "/preferences",
    tag = "Subscriptions",
    request_body = PreferencesBody,
    responses(
        (status = 200, description = "Preferences replaced", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PreferencesBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    state
        .users()
        .update_preferences(user.id, &payload.into())
        .await?;

    Ok(MessageResponse::new("Preferences updated successfully"))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Subscriptions",
    responses((status = 200, description = "Number of subscribed users", body = StatsResponse))
)]
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let subscribers = state.users().count_subscribed().await?;
    Ok(Json(StatsResponse { subscribers }))
}
