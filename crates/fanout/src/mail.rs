//! Email delivery for fanned-out notifications.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use notifyhub_config::SmtpConfig;
use notifyhub_database::Notification;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// No relay host has been configured.
    #[error("SMTP host is not configured")]
    NotConfigured,

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

/// Delivers a single notification to a single address.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, notification: &Notification) -> Result<(), EmailError>;
}

/// [`Mailer`] backed by an SMTP relay using STARTTLS.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, EmailError> {
        let host = config.host.as_deref().ok_or(EmailError::NotConfigured)?;
        let from: Mailbox = config.from_address.parse()?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?.port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, notification: &Notification) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(render_subject(notification))
            .header(ContentType::TEXT_PLAIN)
            .body(render_body(notification))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport.send(email).await?;

        tracing::debug!(to, notification_id = notification.id, "notification email sent");
        Ok(())
    }
}

pub fn render_subject(notification: &Notification) -> String {
    format!("[NotifyHub] New {} notification", notification.topic)
}

pub fn render_body(notification: &Notification) -> String {
    format!(
        "A new notification matches your preferences.\n\n\
         Topic: {}\n\
         Priority: {}\n\
         Category: {}\n\
         Release time: {}\n",
        notification.topic,
        notification.priority,
        notification.category,
        notification.release_time.to_rfc3339(),
    )
}
