//! Failures that can end a polling cycle early.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::homework::{FetchError, ShapeError};

/// A recoverable failure raised while fetching or interpreting the API answer.
///
/// Send failures are not part of this type; they end the loop instead.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl CycleError {
    /// Returns the kind of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(err) => err.kind(),
            Self::Shape(err) => err.kind(),
        }
    }
}

/// Flat classification of [`CycleError`] used for branching and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// DNS, connection or timeout fault.
    Transport,
    /// Non-200 answer from the review API.
    BadStatus,
    /// Any other fault while issuing the request.
    Request,
    /// Body is not JSON.
    Decode,
    /// A value has the wrong JSON type.
    Type,
    /// `homeworks` or `current_date` is missing.
    EmptyAnswer,
    /// A homework lacks `homework_name` or `status`.
    MissingField,
    /// A homework status outside the verdict table.
    UnknownStatus,
}

impl ErrorKind {
    pub const ALL: [Self; 8] = [
        Self::Transport,
        Self::BadStatus,
        Self::Request,
        Self::Decode,
        Self::Type,
        Self::EmptyAnswer,
        Self::MissingField,
        Self::UnknownStatus,
    ];

    /// Returns the configuration name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::BadStatus => "bad_status",
            Self::Request => "request",
            Self::Decode => "decode",
            Self::Type => "type",
            Self::EmptyAnswer => "empty_answer",
            Self::MissingField => "missing_field",
            Self::UnknownStatus => "unknown_status",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or(ConfigError::UnknownErrorKind(name))
    }
}
