//! Credentials and polling settings.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    DEFAULT_ENDPOINT, DEFAULT_LOG_FILE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_PERIOD_SECS,
    PRACTICUM_TOKEN_VAR, TELEGRAM_CHAT_ID_VAR, TELEGRAM_TOKEN_VAR,
};
use crate::error::ErrorKind;

/// Returns `true` only if all three required values are present and non-empty.
#[must_use]
pub fn check_tokens(
    practicum_token: Option<&str>,
    telegram_token: Option<&str>,
    telegram_chat_id: Option<&str>,
) -> bool {
    [practicum_token, telegram_token, telegram_chat_id]
        .into_iter()
        .all(|value| value.is_some_and(|s| !s.is_empty()))
}

/// Secrets needed to talk to the review API and to Telegram.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth token for the review API.
    pub practicum_token: String,

    /// Telegram bot token.
    pub telegram_token: String,

    /// Chat that receives every notification.
    pub telegram_chat_id: String,
}

impl Credentials {
    /// Reads credentials from `PRACTICUM_TOKEN`, `TELEGRAM_TOKEN` and `TELEGRAM_CHAT_ID`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTokens`] naming every absent or empty variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let practicum_token = lookup(PRACTICUM_TOKEN_VAR);
        let telegram_token = lookup(TELEGRAM_TOKEN_VAR);
        let telegram_chat_id = lookup(TELEGRAM_CHAT_ID_VAR);

        if !check_tokens(
            practicum_token.as_deref(),
            telegram_token.as_deref(),
            telegram_chat_id.as_deref(),
        ) {
            let missing = [
                (PRACTICUM_TOKEN_VAR, &practicum_token),
                (TELEGRAM_TOKEN_VAR, &telegram_token),
                (TELEGRAM_CHAT_ID_VAR, &telegram_chat_id),
            ]
            .into_iter()
            .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| name)
            .collect();
            return Err(ConfigError::MissingTokens(missing));
        }

        Ok(Self {
            practicum_token: practicum_token.unwrap_or_default(),
            telegram_token: telegram_token.unwrap_or_default(),
            telegram_chat_id: telegram_chat_id.unwrap_or_default(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &mask_secret(&self.practicum_token))
            .field("telegram_token", &mask_secret(&self.telegram_token))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// How the `from_date` cursor moves between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorPolicy {
    /// Move the cursor to the server's `current_date` after every successful fetch.
    #[default]
    Advance,

    /// Always request from the Unix epoch.
    FromEpoch,
}

impl FromStr for CursorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "advance" => Ok(Self::Advance),
            "from_epoch" => Ok(Self::FromEpoch),
            other => Err(ConfigError::InvalidCursorPolicy(other.to_owned())),
        }
    }
}

/// Non-secret settings of the polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerSettings {
    /// Review API endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Telegram Bot API server, if not the public one.
    #[serde(default)]
    pub telegram_api_url: Option<String>,

    /// Seconds to sleep between cycles.
    #[serde(default = "default_retry_period")]
    pub retry_period_secs: u64,

    /// Timeout of a single review API request in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Cursor movement between cycles.
    #[serde(default)]
    pub cursor_policy: CursorPolicy,

    /// Failure kinds that are logged but never relayed to the chat.
    #[serde(default)]
    pub local_only: BTreeSet<ErrorKind>,

    /// Append-only log file.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

fn default_retry_period() -> u64 {
    DEFAULT_RETRY_PERIOD_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            telegram_api_url: None,
            retry_period_secs: default_retry_period(),
            request_timeout_secs: default_request_timeout(),
            cursor_policy: CursorPolicy::default(),
            local_only: BTreeSet::new(),
            log_file: default_log_file(),
        }
    }
}

impl PollerSettings {
    /// Creates settings from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an optional variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PollerSettings::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let local_only = match non_empty("LOCAL_ONLY_ERRORS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|kind| !kind.is_empty())
                .map(str::parse)
                .collect::<Result<BTreeSet<ErrorKind>, _>>()?,
            None => defaults.local_only,
        };

        Ok(Self {
            endpoint: non_empty("PRACTICUM_ENDPOINT").unwrap_or(defaults.endpoint),
            telegram_api_url: non_empty("TELEGRAM_API_URL"),
            retry_period_secs: parse_secs(
                "RETRY_PERIOD_SECS",
                non_empty("RETRY_PERIOD_SECS"),
                defaults.retry_period_secs,
            )?,
            request_timeout_secs: parse_secs(
                "REQUEST_TIMEOUT_SECS",
                non_empty("REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            )?,
            cursor_policy: non_empty("CURSOR_POLICY")
                .map(|value| value.parse())
                .transpose()?
                .unwrap_or(defaults.cursor_policy),
            local_only,
            log_file: non_empty("LOG_FILE").map_or(defaults.log_file, PathBuf::from),
        })
    }

    /// Pause between two cycles.
    #[must_use]
    pub const fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    /// Timeout of a single review API request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_secs(var: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidNumber { var, value: raw }),
        },
        None => Ok(default),
    }
}

/// Hides all but the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count > 4 {
        let tail: String = secret.chars().skip(count - 4).collect();
        format!("***{tail}")
    } else {
        "****".to_owned()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingTokens(Vec<&'static str>),

    #[error("Invalid value for {var}: {value:?} (must be a positive integer)")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Invalid cursor policy {0:?} (expected \"advance\" or \"from_epoch\")")]
    InvalidCursorPolicy(String),

    #[error("Unknown error kind {0:?} in LOCAL_ONLY_ERRORS")]
    UnknownErrorKind(String),
}
