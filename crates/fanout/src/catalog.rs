use chrono::{DateTime, Utc};
use notifyhub_config::FanoutConfig;
use notifyhub_database::{CreateNotificationRequest, PreferenceField, PreferenceFilter};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::FanoutError;

/// Values a generated notification may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub topics: Vec<String>,
    pub priorities: Vec<String>,
    pub categories: Vec<String>,
}

/// A notification that has been generated but not yet matched or stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub topic: String,
    pub priority: String,
    pub category: String,
    pub release_time: DateTime<Utc>,
}

impl Catalog {
    pub fn from_config(config: &FanoutConfig) -> Self {
        Self {
            topics: config.topics.clone(),
            priorities: config.priorities.clone(),
            categories: config.categories.clone(),
        }
    }

    /// Pick one value of each attribute at random, released now.
    pub fn draft<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NotificationDraft, FanoutError> {
        let topic = self.topics.choose(rng).ok_or(FanoutError::EmptyCatalog("topic"))?;
        let priority = self
            .priorities
            .choose(rng)
            .ok_or(FanoutError::EmptyCatalog("priority"))?;
        let category = self
            .categories
            .choose(rng)
            .ok_or(FanoutError::EmptyCatalog("category"))?;

        Ok(NotificationDraft {
            topic: topic.clone(),
            priority: priority.clone(),
            category: category.clone(),
            release_time: Utc::now(),
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_config(&FanoutConfig::default())
    }
}

impl NotificationDraft {
    /// Subscribers receive the draft only when every attribute is in their
    /// preference lists. Release time is not matched.
    pub fn filter(&self) -> PreferenceFilter {
        PreferenceFilter::new()
            .require(PreferenceField::Topic, self.topic.as_str())
            .require(PreferenceField::Priority, self.priority.as_str())
            .require(PreferenceField::Category, self.category.as_str())
    }

    pub fn into_request(self, sent_to: Vec<String>) -> CreateNotificationRequest {
        CreateNotificationRequest {
            topic: self.topic,
            release_time: self.release_time,
            priority: self.priority,
            category: self.category,
            sent_to,
        }
    }
}
