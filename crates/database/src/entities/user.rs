//! User entity definitions

use serde::{Deserialize, Serialize};

/// User entity representing a subscriber in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Stable identifier recorded as a notification recipient.
    pub public_id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub subscribed: bool,
    pub preferences: Preferences,
    pub created_at: String,
    pub updated_at: String,
}

/// Request for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password_hash: String,
    pub preferences: Preferences,
}

/// Per-user filter lists matched against notification attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub topic: Vec<String>,
    pub release_time: Vec<String>,
    pub priority: Vec<String>,
    pub category: Vec<String>,
}

impl Preferences {
    pub fn values(&self, field: PreferenceField) -> &[String] {
        match field {
            PreferenceField::Topic => &self.topic,
            PreferenceField::ReleaseTime => &self.release_time,
            PreferenceField::Priority => &self.priority,
            PreferenceField::Category => &self.category,
        }
    }

    pub fn contains(&self, field: PreferenceField, value: &str) -> bool {
        self.values(field).iter().any(|candidate| candidate == value)
    }
}

/// Named preference list inside [`Preferences`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceField {
    Topic,
    ReleaseTime,
    Priority,
    Category,
}

impl PreferenceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceField::Topic => "topic",
            PreferenceField::ReleaseTime => "release_time",
            PreferenceField::Priority => "priority",
            PreferenceField::Category => "category",
        }
    }

    /// JSON path of this list inside the stored preferences document.
    pub fn json_path(&self) -> &'static str {
        match self {
            PreferenceField::Topic => "$.topic",
            PreferenceField::ReleaseTime => "$.release_time",
            PreferenceField::Priority => "$.priority",
            PreferenceField::Category => "$.category",
        }
    }
}

impl std::fmt::Display for PreferenceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunction of "preference list contains value" clauses.
///
/// ```
/// use notifyhub_database::{PreferenceField, PreferenceFilter, Preferences};
///
/// let filter = PreferenceFilter::new()
///     .require(PreferenceField::Topic, "tech")
///     .require(PreferenceField::Priority, "high");
///
/// let mut preferences = Preferences::default();
/// preferences.topic.push("tech".into());
/// assert!(!filter.matches(&preferences));
///
/// preferences.priority.push("high".into());
/// assert!(filter.matches(&preferences));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceFilter {
    clauses: Vec<(PreferenceField, String)>,
}

impl PreferenceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, field: PreferenceField, value: impl Into<String>) -> Self {
        self.clauses.push((field, value.into()));
        self
    }

    pub fn clauses(&self) -> &[(PreferenceField, String)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, preferences: &Preferences) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| preferences.contains(*field, value))
    }
}
