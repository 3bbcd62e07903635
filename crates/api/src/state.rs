use notifyhub_auth::Authenticator;
use notifyhub_database::{NotificationRepository, User, UserRepository};

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    notifications: NotificationRepository,
}

impl AppState {
    pub fn new(authenticator: Authenticator, notifications: NotificationRepository) -> Self {
        Self {
            authenticator,
            notifications,
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn users(&self) -> &UserRepository {
        self.authenticator.users()
    }

    pub fn notifications(&self) -> &NotificationRepository {
        &self.notifications
    }

    pub async fn authenticate(&self, token: &str) -> Result<User, ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}
