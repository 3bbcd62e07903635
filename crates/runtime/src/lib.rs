use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use notifyhub_auth::Authenticator;
use notifyhub_config::AppConfig;
use notifyhub_database::{initialize_database, NotificationRepository, UserRepository};
use notifyhub_fanout::{Catalog, EmailError, FanoutJob, FanoutScheduler, SmtpMailer};
use sqlx::SqlitePool;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub notifications: NotificationRepository,
    pub fanout: FanoutJob,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database).await?;

        let authenticator = Authenticator::new(db_pool.clone(), &config.auth);
        let users = UserRepository::new(db_pool.clone());
        let notifications = NotificationRepository::new(db_pool.clone());

        let mut fanout = FanoutJob::new(
            users,
            notifications.clone(),
            Catalog::from_config(&config.fanout),
        );

        if config.fanout.send_email {
            match SmtpMailer::from_config(&config.smtp) {
                Ok(mailer) => {
                    info!(host = ?config.smtp.host, port = config.smtp.port, "smtp mailer ready");
                    fanout = fanout.with_mailer(Arc::new(mailer));
                }
                Err(EmailError::NotConfigured) => {
                    warn!("fanout.send_email is set but smtp.host is missing, email delivery disabled");
                }
                Err(error) => return Err(error).context("failed to configure smtp mailer"),
            }
        }

        info!(email = fanout.sends_email(), "fanout job ready");

        Ok(Self {
            db_pool,
            authenticator,
            notifications,
            fanout,
        })
    }

    /// Scheduler for the fanout job using the configured interval.
    pub fn scheduler(&self, config: &AppConfig) -> FanoutScheduler {
        FanoutScheduler::new(
            self.fanout.clone(),
            Duration::from_secs(config.fanout.interval_seconds.max(1)),
        )
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
