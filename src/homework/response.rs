//! Shape validation of the review API answer.

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use super::json_type_name;
use crate::error::ErrorKind;

const HOMEWORKS_KEY: &str = "homeworks";
const CURRENT_DATE_KEY: &str = "current_date";

/// The API answer reduced to what the poller needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedResponse {
    /// Homework records, newest first. Element shape is not checked here.
    pub homeworks: Vec<Value>,

    /// Server time of the answer, usable as the next cursor.
    pub current_date: i64,
}

/// The API answer or a homework inside it does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("API answer is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },

    #[error("API returned a JSON {found} under key homeworks, expected a list")]
    HomeworksNotAList { found: &'static str },

    #[error("API returned a JSON {found} under key current_date, expected an integer timestamp")]
    InvalidCurrentDate { found: &'static str },

    #[error("Empty API answer: key {missing_key} is missing")]
    EmptyAnswer { missing_key: &'static str },

    #[error("Homework is a JSON {found}, expected an object")]
    HomeworkNotAnObject { found: &'static str },

    #[error("Key {0} not found in homework")]
    MissingField(&'static str),

    #[error("Unknown homework status {0:?}")]
    UnknownStatus(String),
}

impl ShapeError {
    /// Returns the kind of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAnObject { .. }
            | Self::HomeworksNotAList { .. }
            | Self::InvalidCurrentDate { .. }
            | Self::HomeworkNotAnObject { .. } => ErrorKind::Type,
            Self::EmptyAnswer { .. } => ErrorKind::EmptyAnswer,
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::UnknownStatus(_) => ErrorKind::UnknownStatus,
        }
    }
}

/// Checks that `raw` is an object with a `homeworks` list and a `current_date` timestamp.
///
/// The homework list is returned unchanged.
pub fn check_response(raw: &Value) -> Result<CheckedResponse, ShapeError> {
    info!("Checking API answer");

    let Some(object) = raw.as_object() else {
        return Err(ShapeError::NotAnObject {
            found: json_type_name(raw),
        });
    };

    let Some(current_date) = object.get(CURRENT_DATE_KEY) else {
        return Err(ShapeError::EmptyAnswer {
            missing_key: CURRENT_DATE_KEY,
        });
    };
    let Some(homeworks) = object.get(HOMEWORKS_KEY) else {
        return Err(ShapeError::EmptyAnswer {
            missing_key: HOMEWORKS_KEY,
        });
    };

    let Some(homeworks) = homeworks.as_array() else {
        return Err(ShapeError::HomeworksNotAList {
            found: json_type_name(homeworks),
        });
    };
    let Some(current_date) = current_date.as_i64() else {
        return Err(ShapeError::InvalidCurrentDate {
            found: json_type_name(current_date),
        });
    };

    Ok(CheckedResponse {
        homeworks: homeworks.clone(),
        current_date,
    })
}
