use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "notifyhub.toml",
    "config/notifyhub.toml",
    "crates/config/notifyhub.toml",
    "../notifyhub.toml",
    "../config/notifyhub.toml",
    "../crates/config/notifyhub.toml",
];

/// Upper bound for access token lifetime: one year.
pub const MAX_TOKEN_TTL_MINUTES: u64 = 60 * 24 * 365;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub fanout: FanoutConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://notifyhub.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Bearer token settings.
///
/// ```
/// use notifyhub_config::AuthConfig;
///
/// let auth = AuthConfig::default();
/// assert_eq!(auth.token_ttl_minutes, 30);
/// assert_eq!(auth.issuer, "notifyhub");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 signing secret.
    pub secret: String,
    pub issuer: String,
    pub token_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            issuer: "notifyhub".to_string(),
            token_ttl_minutes: 30,
        }
    }
}

/// Settings for the periodic notification fanout.
///
/// The three catalogues are the values a generated notification draws its
/// topic, priority and category from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    /// Email every recipient after the notification is stored.
    pub send_email: bool,
    pub topics: Vec<String>,
    pub priorities: Vec<String>,
    pub categories: Vec<String>,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            send_email: false,
            topics: vec!["tech".into(), "sports".into(), "news".into()],
            priorities: vec!["low".into(), "medium".into(), "high".into()],
            categories: vec!["general".into(), "alert".into(), "update".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP relay host. Mail delivery is unavailable while this is unset.
    pub host: Option<String>,
    pub port: u16,
    pub from_address: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 587,
            from_address: "noreply@notifyhub.local".to_string(),
            username: None,
            password: None,
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use notifyhub_config::load;
///
/// std::env::remove_var("NOTIFYHUB_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.secret", defaults.auth.secret.clone())?
        .set_default("auth.issuer", defaults.auth.issuer.clone())?
        .set_default(
            "auth.token_ttl_minutes",
            i64::try_from(defaults.auth.token_ttl_minutes).unwrap_or(i64::MAX),
        )?
        .set_default("fanout.enabled", defaults.fanout.enabled)?
        .set_default(
            "fanout.interval_seconds",
            i64::try_from(defaults.fanout.interval_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("fanout.send_email", defaults.fanout.send_email)?
        .set_default("smtp.port", i64::from(defaults.smtp.port))?
        .set_default("smtp.from_address", defaults.smtp.from_address.clone())?;

    let environment_overrides = config::Environment::with_prefix("NOTIFYHUB")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("fanout.topics")
        .with_list_parse_key("fanout.priorities")
        .with_list_parse_key("fanout.categories");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("NOTIFYHUB_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via NOTIFYHUB_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.fanout.interval_seconds == 0 {
        warn!("fanout.interval_seconds must be positive, using 1");
        config.fanout.interval_seconds = 1;
    }

    if config.auth.token_ttl_minutes == 0 || config.auth.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
        let clamped = config.auth.token_ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES);
        warn!(
            requested = config.auth.token_ttl_minutes,
            clamped, "auth.token_ttl_minutes out of range"
        );
        config.auth.token_ttl_minutes = clamped;
    }

    debug!(
        http = ?config.http,
        database = ?config.database,
        fanout = ?config.fanout,
        smtp_host = ?config.smtp.host,
        "loaded backend configuration"
    );
    Ok(config)
}
