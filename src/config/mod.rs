//! Configuration module for the homework status bot.
//!
//! Handles loading and validation of credentials and polling settings
//! from the process environment.

mod settings;

pub use settings::{ConfigError, Credentials, CursorPolicy, PollerSettings, check_tokens};

/// Review API endpoint returning the user's homework statuses.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Pause between two polling cycles.
pub const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;

/// Upper bound for a single request to the review API.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Append-only log file shared with stdout.
pub const DEFAULT_LOG_FILE: &str = "logfile.log";

pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";
