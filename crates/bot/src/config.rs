use std::time::Duration;

use grocery_core::roles::CoordinatorSet;
use grocery_core::types::TelegramId;

use crate::background::retention::RetentionSettings;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/grocery.db";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("At least one coordinator ID is required")]
    NoCoordinators,
}

/// Bot configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    /// Group chat where requests are posted.
    pub volunteer_chat_id: TelegramId,
    pub coordinators: CoordinatorSet,
    pub database_url: String,
    /// Public base URL; when set the bot runs in webhook mode.
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub host: String,
    pub port: u16,
    pub telegram_api_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout: Duration,
    pub retention: RetentionSettings,
}

impl BotConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var               | Default                      |
    /// |-----------------------|------------------------------|
    /// | `TELEGRAM_BOT_TOKEN`  | required                     |
    /// | `VOLUNTEER_CHAT_ID`   | required                     |
    /// | `COORDINATOR_IDS`     | required, comma-separated    |
    /// | `DATABASE_URL`        | `sqlite://data/grocery.db`   |
    /// | `WEBHOOK_URL`         | none (long polling)          |
    /// | `WEBHOOK_SECRET`      | none                         |
    /// | `HOST`                | `0.0.0.0`                    |
    /// | `PORT`                | `8080`                       |
    /// | `TELEGRAM_API_URL`    | `https://api.telegram.org`   |
    /// | `POLL_TIMEOUT_SECS`   | `60`                         |
    /// | `RETENTION_HOURS`     | `48`                         |
    /// | `SWEEP_INTERVAL_SECS` | `3600`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let telegram_token = required("TELEGRAM_BOT_TOKEN")?;
        let volunteer_chat_id = parse("VOLUNTEER_CHAT_ID", &required("VOLUNTEER_CHAT_ID")?)?;

        let coordinator_ids = required("COORDINATOR_IDS")?
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| parse::<TelegramId>("COORDINATOR_IDS", id))
            .collect::<Result<Vec<_>, _>>()?;
        let coordinators =
            CoordinatorSet::new(coordinator_ids).map_err(|_| ConfigError::NoCoordinators)?;

        let defaults = RetentionSettings::default();
        let retention = RetentionSettings {
            retention: match var("RETENTION_HOURS") {
                Some(raw) => retention_window(&raw)?,
                None => defaults.retention,
            },
            interval: match var("SWEEP_INTERVAL_SECS") {
                Some(raw) => sweep_interval(&raw)?,
                None => defaults.interval,
            },
        };

        Ok(Self {
            telegram_token,
            volunteer_chat_id,
            coordinators,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            webhook_url: var("WEBHOOK_URL").map(|url| url.trim_end_matches('/').to_string()),
            webhook_secret: var("WEBHOOK_SECRET"),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: var("PORT")
                .map(|raw| parse("PORT", &raw))
                .transpose()?
                .unwrap_or(8080),
            telegram_api_url: var("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.into()),
            poll_timeout: Duration::from_secs(
                var("POLL_TIMEOUT_SECS")
                    .map(|raw| parse("POLL_TIMEOUT_SECS", &raw))
                    .transpose()?
                    .unwrap_or(60),
            ),
            retention,
        })
    }

    pub fn is_webhook_mode(&self) -> bool {
        self.webhook_url.is_some()
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

/// A positive number of hours that fits in a `chrono::Duration`.
fn retention_window(raw: &str) -> Result<chrono::Duration, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "RETENTION_HOURS",
        value: raw.to_string(),
    };
    let hours: i64 = parse("RETENTION_HOURS", raw)?;
    if hours <= 0 {
        return Err(invalid());
    }
    chrono::Duration::try_hours(hours).ok_or_else(invalid)
}

/// `tokio::time::interval` panics on a zero period.
fn sweep_interval(raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = parse("SWEEP_INTERVAL_SECS", raw)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key: "SWEEP_INTERVAL_SECS",
            value: raw.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
