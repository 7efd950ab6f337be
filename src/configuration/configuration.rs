use std::fmt;
use std::net::SocketAddr;
use std::num::ParseIntError;

use reqwest::Url;
use thiserror::Error;
use tracing::info;

pub const BOT_TOKEN: &str = "BOT_TOKEN";
pub const BEARER_TOKEN: &str = "BEARER_TOKEN";
pub const CHAT_ID: &str = "CHAT_ID";
pub const PORT: &str = "PORT";
pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} env var must be set")]
    Missing(&'static str),

    #[error("failed to parse {name}")]
    Invalid {
        name: &'static str,
        #[source]
        source: ParseIntError,
    },

    #[error("{0} must not be zero")]
    Zero(&'static str),

    #[error("failed to parse TELEGRAM_API_URL as a URL")]
    InvalidUrl(#[source] url::ParseError),
}

/// Process-wide settings, loaded once at startup and never mutated.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub bot_token: String,
    pub bearer_token: String,
    pub chat_id: i64,
    pub port: u16,
    /// Overrides the Bot API base URL, e.g. for a self-hosted Bot API server.
    pub telegram_api_url: Option<Url>,
}

// Credentials stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("bearer_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("port", &self.port)
            .field("telegram_api_url", &self.telegram_api_url)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Every required value
    /// must be present and non-empty, and numeric values must be non-zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = required(&lookup, BOT_TOKEN)?;
        let bearer_token = required(&lookup, BEARER_TOKEN)?;

        let chat_id: i64 = parse_non_zero(&lookup, CHAT_ID)?;
        let port: u16 = parse_non_zero(&lookup, PORT)?;

        let telegram_api_url = match lookup(TELEGRAM_API_URL).filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(Url::parse(raw.trim()).map_err(ConfigError::InvalidUrl)?),
            None => None,
        };

        let config = Config {
            bot_token,
            bearer_token,
            chat_id,
            port,
            telegram_api_url,
        };
        info!(chat_id = config.chat_id, port = config.port, "Loaded configuration");

        Ok(config)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_non_zero<F, T>(lookup: &F, name: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr<Err = ParseIntError> + Default + PartialEq,
{
    let raw = required(lookup, name)?;
    let value: T = raw
        .parse()
        .map_err(|source| ConfigError::Invalid { name, source })?;

    if value == T::default() {
        return Err(ConfigError::Zero(name));
    }

    Ok(value)
}
