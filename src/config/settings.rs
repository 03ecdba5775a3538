//! Application settings.
//!
//! Non-secret settings live in `config.toml` (path overridable with `CONFIG_PATH`);
//! every field has a default so a missing file or section still yields a usable
//! configuration. Secrets (bot token, admin API password) and the database URL are
//! read from the environment, which `main` populates from `.env` via `dotenvy`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::{debug, info, warn};

/// Default location of the settings file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chat bot behaviour
    pub bot: BotSettings,
    /// HTTP listener
    pub server: ServerSettings,
    /// Order lifecycle
    pub orders: OrderSettings,
    /// Outbound message delivery
    pub notifications: NotificationSettings,
}

/// `[bot]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Telegram handle of the shop admin, with or without the leading `@`
    pub admin_username: String,
    /// Chat that receives new-order and new-feedback notices
    pub admin_chat_id: Option<i64>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            admin_username: "easyshop_admin".to_string(),
            admin_chat_id: None,
        }
    }
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the webhook and admin API listen on
    pub bind_address: String,
    /// Upper bound on processing a single webhook event
    pub event_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            event_timeout_secs: 10,
        }
    }
}

impl ServerSettings {
    /// Event timeout as a [`Duration`].
    #[must_use]
    pub const fn event_timeout(&self) -> Duration {
        Duration::from_secs(self.event_timeout_secs)
    }
}

/// `[orders]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrderSettings {
    /// Days between accepting an order and its promised ready-by date
    pub ready_by_days: i64,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self { ready_by_days: 3 }
    }
}

/// `[notifications]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Extra attempts after a failed `sendMessage`
    pub max_retries: usize,
    /// First backoff delay; doubles on every retry
    pub retry_base_delay_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay_ms: 200,
        }
    }
}

/// Secrets and connection strings taken from the environment.
#[derive(Clone)]
pub struct Secrets {
    /// Bot API token
    pub telegram_bot_token: String,
    /// Value expected in the `X-Admin-Password` header
    pub admin_api_password: String,
    /// sea-orm connection string
    pub database_url: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_bot_token", &"<redacted>")
            .field("admin_api_password", &"<redacted>")
            .field("database_url", &self.database_url)
            .finish()
    }
}

impl Secrets {
    /// Reads `TELEGRAM_BOT_TOKEN`, `ADMIN_API_PASSWORD` and `DATABASE_URL`.
    ///
    /// # Errors
    /// Returns an error if the token or the admin password is not set.
    pub fn from_env() -> Result<Self> {
        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN")?;
        let admin_api_password = std::env::var("ADMIN_API_PASSWORD")?;
        if admin_api_password.trim().is_empty() {
            return Err(Error::Config {
                message: "ADMIN_API_PASSWORD must not be empty".to_string(),
            });
        }
        Ok(Self {
            telegram_bot_token,
            admin_api_password,
            database_url: crate::config::database::get_database_url(),
        })
    }
}

/// Parses settings from TOML text and validates them.
///
/// # Errors
/// Returns an error if the TOML is invalid or a value is out of range.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    validate(&config)?;
    Ok(config)
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads settings from `CONFIG_PATH` (or `config.toml`), falling back to defaults when the file is absent.
///
/// # Errors
/// Returns an error if the file exists but is invalid.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {path}");
        Ok(config)
    } else {
        warn!("Config file {path} not found, using defaults");
        let config = AppConfig::default();
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.bot.admin_username.trim_start_matches('@').trim().is_empty() {
        return Err(Error::Config {
            message: "bot.admin_username must not be empty".to_string(),
        });
    }
    if config.orders.ready_by_days < 0 {
        return Err(Error::Config {
            message: "orders.ready_by_days must not be negative".to_string(),
        });
    }
    if config.server.event_timeout_secs == 0 {
        return Err(Error::Config {
            message: "server.event_timeout_secs must be positive".to_string(),
        });
    }
    Ok(())
}
