//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable          | Default        | Meaning                                  |
//! |-------------------|----------------|------------------------------------------|
//! | `LISTEN_ADDR`     | `0.0.0.0:3000` | Socket address to bind                   |
//! | `JWT_SECRET`      | (required)     | HMAC secret used to verify bearer tokens |
//! | `JWT_LEEWAY_SECS` | `0`            | Clock skew tolerated on `exp`            |
//! | `HUB_CAPACITY`    | `256`          | Events buffered per subscriber           |
//! | `MAX_MESSAGE_LEN` | `2000`         | Longest accepted chat body, in chars     |
//! | `LOG_FORMAT`      | `text`         | `text` or `json`                         |

use std::fmt;
use std::net::SocketAddr;

use crate::domain::broadcast_hub::DEFAULT_HUB_CAPACITY;

/// Default limit on a chat message body, in characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 2000;

/// Errors raised while loading [`GatewayConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `JWT_SECRET` is unset or empty.
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingJwtSecret,

    /// `LISTEN_ADDR` is not a valid socket address.
    #[error("invalid LISTEN_ADDR {value:?}: {source}")]
    InvalidListenAddr {
        /// The rejected value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Shared secret for HS256 token verification.
    pub jwt_secret: String,

    /// Seconds of clock skew tolerated when checking `exp`.
    pub jwt_leeway_secs: u64,

    /// Events each subscriber may buffer before it is disconnected.
    pub hub_capacity: usize,

    /// Longest accepted chat body, in characters, after trimming.
    pub max_message_len: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("listen_addr", &self.listen_addr)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_leeway_secs", &self.jwt_leeway_secs)
            .field("hub_capacity", &self.hub_capacity)
            .field("max_message_len", &self.max_message_len)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file,
    /// then falls back to defaults for every variable except `JWT_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `JWT_SECRET` is missing or `LISTEN_ADDR`
    /// cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`GatewayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|source| ConfigError::InvalidListenAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            jwt_secret,
            jwt_leeway_secs: parse_or(&lookup, "JWT_LEEWAY_SECS", 0),
            hub_capacity: parse_or(&lookup, "HUB_CAPACITY", DEFAULT_HUB_CAPACITY).max(1),
            max_message_len: parse_or(&lookup, "MAX_MESSAGE_LEN", DEFAULT_MAX_MESSAGE_LEN),
            log_format,
        })
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
