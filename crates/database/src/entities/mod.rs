//! Domain entities for the database layer

pub mod notification;
pub mod user;

pub use notification::{CreateNotificationRequest, Notification};
pub use user::{CreateUserRequest, PreferenceField, PreferenceFilter, Preferences, User};
