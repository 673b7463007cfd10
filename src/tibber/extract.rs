//! Pulls the `(code, message)` pair out of a GraphQL `errors` array.

use super::UNKNOWN_CODE;
use serde_json::Value;

/// One entry of a GraphQL `errors` array, with absent fields left as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEntry {
    pub message: Option<String>,
    pub code: Option<String>,
}

impl ErrorEntry {
    /// Read an entry leniently: non-objects and mistyped fields count as absent.
    pub fn from_value(value: &Value) -> Self {
        Self {
            message: value["message"].as_str().map(|s| s.to_string()),
            code: value["extensions"]["code"].as_str().map(|s| s.to_string()),
        }
    }
}

/// Return `(code, message)` from the first error entry.
///
/// Later entries are ignored. Missing pieces fall back to [`UNKNOWN_CODE`] and
/// `default_message`.
pub fn extract_error_details(errors: &[Value], default_message: &str) -> (String, String) {
    let Some(first) = errors.first() else {
        return (UNKNOWN_CODE.to_string(), default_message.to_string());
    };
    let entry = ErrorEntry::from_value(first);
    (
        entry.code.unwrap_or_else(|| UNKNOWN_CODE.to_string()),
        entry.message.unwrap_or_else(|| default_message.to_string()),
    )
}
