//! # Service Configuration
//!
//! Built once from the process environment by [`AppConfig::from_env`].
//! Unset variables take their defaults; set but malformed values are a
//! startup error rather than a silent fallback.
//!
//! | Variable           | Default                    |
//! |--------------------|----------------------------|
//! | `PORT`             | `8080`                     |
//! | `PLAN_SCHEMA_PATH` | `schemas/plan.schema.json` |
//! | `STORE_TIMEOUT_MS` | `5000`                     |
//! | `PLAN_TTL_SECS`    | unset (no expiry)          |
//! | `DATABASE_URL`     | unset (in-memory store)    |
//! | `LOG_FORMAT`       | `text` (`json` for JSON)   |
//!
//! `RUST_LOG` is read directly by the tracing subscriber.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use plan_schema::DEFAULT_SCHEMA_PATH;
use plan_store::DEFAULT_STORE_TIMEOUT;
use thiserror::Error;

/// A configuration variable was set to an unusable value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    /// Environment variable name.
    pub var: &'static str,
    /// The rejected value.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?}, expected text or json")),
        }
    }
}

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to, on all interfaces.
    pub port: u16,
    /// Location of the plan JSON Schema.
    pub schema_path: PathBuf,
    /// Deadline for each backing-store call.
    pub store_timeout: Duration,
    /// Expiry applied to stored plans. `None` keeps them until deleted.
    pub plan_ttl: Option<Duration>,
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Tracing output format.
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("schema_path", &self.schema_path)
            .field("store_timeout", &self.store_timeout)
            .field("plan_ttl", &self.plan_ttl)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            plan_ttl: None,
            database_url: None,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        // Empty values count as unset.
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => parse::<u16>("PORT", &raw)?,
            None => defaults.port,
        };

        let schema_path = get("PLAN_SCHEMA_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.schema_path);

        let store_timeout = match get("STORE_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(positive("STORE_TIMEOUT_MS", &raw)?),
            None => defaults.store_timeout,
        };

        let plan_ttl = get("PLAN_TTL_SECS")
            .map(|raw| positive("PLAN_TTL_SECS", &raw).map(Duration::from_secs))
            .transpose()?;

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|reason| ConfigError {
                var: "LOG_FORMAT",
                value: raw.clone(),
                reason,
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            port,
            schema_path,
            store_timeout,
            plan_ttl,
            database_url: get("DATABASE_URL"),
            log_format,
        })
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match parse::<u64>(var, raw)? {
        0 => Err(ConfigError {
            var,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        n => Ok(n),
    }
}
