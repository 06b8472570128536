use std::env;
use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 300;
const DEFAULT_FEED_TIMEOUT_SECONDS: u64 = 10;

/// Runtime configuration, collected once at startup. Missing required
/// variables abort startup; the process never serves half-configured.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Flickr account NSID, e.g. `12345@N01`.
    pub flickr_user: String,
    /// Shared secret expected in the `X-Admin-Key` header.
    pub admin_key: String,
    pub port: u16,
    pub poll_interval: Duration,
    pub feed_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required_var("DATABASE_URL")?,
            flickr_user: required_var("FLICKR_USER")?,
            admin_key: required_var("ADMIN_KEY")?,
            port: optional_var("PORT")?
                .map(|value| parse_var("PORT", &value))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
            poll_interval: Duration::from_secs(
                optional_var("POLL_INTERVAL_SECONDS")?
                    .map(|value| parse_var("POLL_INTERVAL_SECONDS", &value))
                    .transpose()?
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
            ),
            feed_timeout: Duration::from_secs(
                optional_var("FEED_TIMEOUT_SECONDS")?
                    .map(|value| parse_var("FEED_TIMEOUT_SECONDS", &value))
                    .transpose()?
                    .unwrap_or(DEFAULT_FEED_TIMEOUT_SECONDS),
            ),
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    optional_var(name)?.ok_or(ConfigError::MissingVar { name })
}

fn optional_var(name: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { name }),
    }
}

fn parse_var<T: std::str::FromStr<Err = ParseIntError>>(
    name: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidVar { name, source })
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MissingVar: {name}")]
    MissingVar {
        name: &'static str,
    },

    #[error("InvalidVar: {name}: {source}")]
    InvalidVar {
        name: &'static str,
        source: ParseIntError,
    },

    #[error("NotUnicode: {name}")]
    NotUnicode {
        name: &'static str,
    },
}
