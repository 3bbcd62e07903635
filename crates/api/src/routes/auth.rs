use axum::{extract::State, http::HeaderMap, Form, Json};
use notifyhub_auth::IssuedToken;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{util::require_bearer, ApiError, AppState};

/// OAuth2 password grant form. `username` carries the email address.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub grant_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(value: IssuedToken) -> Self {
        Self {
            access_token: value.access_token,
            token_type: value.token_type,
        }
    }
}

#[utoipa::path(
    post,
    path = "/token",
    tag = "Auth",
    request_body(content = TokenForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 401, description = "Incorrect email or password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let issued = state
        .authenticator()
        .login(&form.username, &form.password)
        .await?;

    Ok(Json(issued.into()))
}

#[utoipa::path(
    get,
    path = "/get-token",
    tag = "Auth",
    responses(
        (status = 200, description = "The bearer token the caller authenticated with", body = TokenResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn current_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}
