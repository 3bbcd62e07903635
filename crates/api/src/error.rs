use axum::http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use notifyhub_auth::AuthError;
use notifyhub_database::{NotificationError, UserError};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let challenge = self.status == StatusCode::UNAUTHORIZED;
        let body = Json(ErrorResponse {
            error: self.message,
        });

        let mut response = (self.status, body).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(error = ?error, "internal error");
        Self::internal_server_error(error.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::UserExists => Self::conflict("User already exists"),
            AuthError::Validation(message) => Self::bad_request(message),
            AuthError::InvalidCredentials => Self::unauthorized("Incorrect email or password"),
            AuthError::InvalidToken | AuthError::TokenExpired => {
                warn!(error = %error, "rejected bearer token");
                Self::unauthorized("Could not validate credentials")
            }
            AuthError::PasswordHash(_) | AuthError::Token(_) | AuthError::Store(_) => {
                error!(error = ?error, "auth error");
                Self::internal_server_error(error.to_string())
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::EmailAlreadyExists => Self::conflict("User already exists"),
            UserError::UserNotFound => Self::unauthorized("Could not validate credentials"),
            other => {
                error!(error = ?other, "user store error");
                Self::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(error: NotificationError) -> Self {
        error!(error = ?error, "notification store error");
        Self::internal_server_error(error.to_string())
    }
}
