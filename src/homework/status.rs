//! Homework statuses and their verdict sentences.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::info;

use super::{ShapeError, json_type_name};

/// Sent instead of a verdict when the API reports no homework for the period.
pub const NO_UPDATES_MESSAGE: &str = "За данный период времени нет сведений.";

/// Review status of a homework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [Self; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Returns the status as reported by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Returns the human-readable verdict for this status.
    #[must_use]
    pub const fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ShapeError::UnknownStatus(s.to_owned()))
    }
}

/// Builds the notification text for a homework with the given name and status.
#[must_use]
pub fn status_message(homework_name: &str, status: HomeworkStatus) -> String {
    format!(
        "Изменился статус проверки работы \"{homework_name}\". {}",
        status.verdict()
    )
}

/// Extracts the status of a single homework record and formats its verdict.
pub fn parse_status(homework: &Value) -> Result<String, ShapeError> {
    info!("Extracting status from homework");

    let Some(homework) = homework.as_object() else {
        return Err(ShapeError::HomeworkNotAnObject {
            found: json_type_name(homework),
        });
    };

    let name = homework
        .get("homework_name")
        .ok_or(ShapeError::MissingField("homework_name"))?;
    let status = homework
        .get("status")
        .ok_or(ShapeError::MissingField("status"))?;

    let status: HomeworkStatus = match status {
        Value::String(s) => s.parse()?,
        other => return Err(ShapeError::UnknownStatus(other.to_string())),
    };

    let name = match name {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Ok(status_message(&name, status))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_approved_sentence() {
        let message = parse_status(&json!({"homework_name": "X", "status": "approved"})).unwrap();
        assert_eq!(
            message,
            "Изменился статус проверки работы \"X\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn test_every_status_has_its_verdict() {
        for status in HomeworkStatus::ALL {
            let message =
                parse_status(&json!({"homework_name": "hw", "status": status.as_str()})).unwrap();
            assert!(message.ends_with(status.verdict()));
        }
    }

    #[test]
    fn test_unknown_status() {
        let err = parse_status(&json!({"homework_name": "X", "status": "unknown_value"})).unwrap_err();
        assert_eq!(err, ShapeError::UnknownStatus("unknown_value".to_owned()));
    }

    #[test]
    fn test_non_string_status_is_unknown() {
        let err = parse_status(&json!({"homework_name": "X", "status": 3})).unwrap_err();
        assert_eq!(err, ShapeError::UnknownStatus("3".to_owned()));
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            parse_status(&json!({"status": "approved"})).unwrap_err(),
            ShapeError::MissingField("homework_name")
        );
        assert_eq!(
            parse_status(&json!({"homework_name": "X"})).unwrap_err(),
            ShapeError::MissingField("status")
        );
    }

    #[test]
    fn test_homework_must_be_an_object() {
        assert_eq!(
            parse_status(&json!("approved")).unwrap_err(),
            ShapeError::HomeworkNotAnObject { found: "string" }
        );
    }

    #[test]
    fn test_formatting_is_pure() {
        let homework = json!({"homework_name": "repeat", "status": "rejected", "id": 7});
        assert_eq!(parse_status(&homework).unwrap(), parse_status(&homework).unwrap());
        assert_eq!(
            parse_status(&homework).unwrap(),
            status_message("repeat", HomeworkStatus::Rejected)
        );
    }
}
