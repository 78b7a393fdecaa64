//! Review API access and interpretation of its answers.
//!
//! [`ApiClient`] fetches the raw JSON, [`check_response`] validates its
//! shape and [`parse_status`] turns a single homework into a verdict sentence.

mod api;
mod response;
mod status;

pub use api::{ApiClient, FetchError, HomeworkSource};
pub use response::{CheckedResponse, ShapeError, check_response};
pub use status::{HomeworkStatus, NO_UPDATES_MESSAGE, parse_status, status_message};

/// Returns a short name of the JSON type of `value` for diagnostics.
pub(crate) const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
