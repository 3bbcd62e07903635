use std::sync::Arc;

use notifyhub_database::{NotificationRepository, UserRepository};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, NotificationDraft};
use crate::mail::Mailer;
use crate::FanoutError;

/// Outcome of a single fanout run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanoutReport {
    pub notification_id: i64,
    pub recipients: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
}

/// Matches a generated notification against subscriber preferences and
/// delivers it.
#[derive(Clone)]
pub struct FanoutJob {
    users: UserRepository,
    notifications: NotificationRepository,
    catalog: Catalog,
    mailer: Option<Arc<dyn Mailer>>,
}

impl FanoutJob {
    pub fn new(users: UserRepository, notifications: NotificationRepository, catalog: Catalog) -> Self {
        Self {
            users,
            notifications,
            catalog,
            mailer: None,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn sends_email(&self) -> bool {
        self.mailer.is_some()
    }

    /// Draw a notification from the catalogue and fan it out.
    pub async fn run_once(&self) -> Result<FanoutReport, FanoutError> {
        let draft = self.catalog.draft(&mut rand::thread_rng())?;
        self.deliver(draft).await
    }

    /// Fan out a specific notification.
    ///
    /// The notification is stored even when nobody matches. Mail failures
    /// are logged per recipient and never abort the run.
    pub async fn deliver(&self, draft: NotificationDraft) -> Result<FanoutReport, FanoutError> {
        let matched = self.users.find_subscribed_matching(&draft.filter()).await?;
        let sent_to = matched.iter().map(|user| user.public_id.clone()).collect();

        let notification = self.notifications.create(&draft.into_request(sent_to)).await?;

        let mut report = FanoutReport {
            notification_id: notification.id,
            recipients: matched.len(),
            emails_sent: 0,
            emails_failed: 0,
        };

        if let Some(mailer) = &self.mailer {
            for user in &matched {
                match mailer.send(&user.email, &notification).await {
                    Ok(()) => report.emails_sent += 1,
                    Err(err) => {
                        report.emails_failed += 1;
                        warn!(
                            notification_id = notification.id,
                            recipient = %user.public_id,
                            error = %err,
                            "failed to email notification"
                        );
                    }
                }
            }
        }

        info!(
            notification_id = notification.id,
            topic = %notification.topic,
            priority = %notification.priority,
            category = %notification.category,
            recipients = report.recipients,
            emails_sent = report.emails_sent,
            emails_failed = report.emails_failed,
            "fanout run complete"
        );

        Ok(report)
    }
}
