//! Scheduled notification fanout.
//!
//! A [`FanoutJob`] draws a notification from the [`Catalog`], matches it
//! against subscriber preferences, persists it with its recipients and
//! optionally emails every recipient through a [`Mailer`]. The
//! [`FanoutScheduler`] repeats that on a fixed interval until cancelled.

pub mod catalog;
pub mod job;
pub mod mail;
pub mod scheduler;

pub use catalog::{Catalog, NotificationDraft};
pub use job::{FanoutJob, FanoutReport};
pub use mail::{render_body, render_subject, EmailError, Mailer, SmtpMailer};
pub use scheduler::FanoutScheduler;

use notifyhub_database::{NotificationError, UserError};

#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    #[error("catalogue has no {0} values")]
    EmptyCatalog(&'static str),
    #[error("user query failed: {0}")]
    Users(#[from] UserError),
    #[error("notification store failed: {0}")]
    Notifications(#[from] NotificationError),
}
