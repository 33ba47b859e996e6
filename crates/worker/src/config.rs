use appointly_core::queue::RetryPolicy;
use chrono::Duration;
use eyre::{Result, WrapErr, eyre};
use std::env;
use std::str::FromStr;
use tracing::Level;

pub const DEFAULT_MAIL_FROM: &str = "Appointly <noreply@appointly.local>";

/// Configuration for the queue worker.
///
/// Every queue setting has a default, so only `DATABASE_URL` must be set.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Database connection URL (required)
    pub database_url: String,
    pub log_level: Level,
    /// Idle wait between polls of an empty queue, in milliseconds
    pub poll_interval_ms: u64,
    /// Deliveries per job before it is marked failed
    pub max_attempts: u32,
    pub backoff_base_seconds: i64,
    pub backoff_max_seconds: i64,
    /// How long a running job may go unfinished before another worker takes it
    pub lease_seconds: i64,
    /// Sender address for outgoing mail
    pub mail_from: String,
}

impl WorkerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable not set"))?;

        let log_level = lookup("LOG_LEVEL")
            .and_then(|raw| Level::from_str(&raw).ok())
            .unwrap_or(Level::INFO);

        let config = Self {
            database_url,
            log_level,
            poll_interval_ms: parse_or(&lookup, "QUEUE_POLL_INTERVAL_MS", 500)?,
            max_attempts: parse_or(&lookup, "QUEUE_MAX_ATTEMPTS", 5)?,
            backoff_base_seconds: parse_or(&lookup, "QUEUE_BACKOFF_BASE_SECONDS", 10)?,
            backoff_max_seconds: parse_or(&lookup, "QUEUE_BACKOFF_MAX_SECONDS", 600)?,
            lease_seconds: parse_or(&lookup, "QUEUE_LEASE_SECONDS", 300)?,
            mail_from: lookup("MAIL_DEFAULT_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
        };

        if config.max_attempts == 0 {
            return Err(eyre!("QUEUE_MAX_ATTEMPTS must be at least 1"));
        }
        if config.lease_seconds <= 0 {
            return Err(eyre!("QUEUE_LEASE_SECONDS must be positive"));
        }
        if config.backoff_base_seconds < 0 || config.backoff_max_seconds < 0 {
            return Err(eyre!("QUEUE_BACKOFF_BASE_SECONDS and QUEUE_BACKOFF_MAX_SECONDS must not be negative"));
        }
        if config.backoff_base_seconds > config.backoff_max_seconds {
            return Err(eyre!(
                "QUEUE_BACKOFF_BASE_SECONDS ({}) exceeds QUEUE_BACKOFF_MAX_SECONDS ({})",
                config.backoff_base_seconds,
                config.backoff_max_seconds
            ));
        }

        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::seconds(self.backoff_base_seconds),
            max_delay: Duration::seconds(self.backoff_max_seconds),
        }
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }

    pub fn lease(&self) -> Duration {
        Duration::seconds(self.lease_seconds)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid {key} value '{raw}'")),
        None => Ok(default),
    }
}
