//! The `{ data, message?, errors? }` envelope every endpoint responds with.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use jobfair_core::validation::FieldErrors;

/// Key used when the API reports errors that are not tied to a field.
pub const GENERAL_ERROR_KEY: &str = "_general";

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    /// Field errors carried by the envelope, if any are present.
    ///
    /// An `errors` key that is null, an empty object, or an empty list
    /// does not count as a failure.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        let errors = field_errors_from_value(self.errors.as_ref()?);
        (!errors.is_empty()).then_some(errors)
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a success body. An empty body (e.g. `204 No Content`)
    /// carries no data.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Self {
                data: None,
                message: None,
                errors: None,
            });
        }
        serde_json::from_str(body)
    }
}

/// Flatten the shapes the API uses for `errors` into a [`FieldErrors`].
///
/// - `{ "field": ["msg", ...] }` and `{ "field": "msg" }` map per field;
/// - `["msg", ...]` and `"msg"` map to [`GENERAL_ERROR_KEY`].
pub fn field_errors_from_value(value: &serde_json::Value) -> FieldErrors {
    let mut out = FieldErrors::new();
    match value {
        serde_json::Value::Object(map) => {
            for (field, messages) in map {
                if let Some(message) = first_message(messages) {
                    out.add(field.clone(), message);
                }
            }
        }
        other => {
            if let Some(message) = first_message(other) {
                out.add(GENERAL_ERROR_KEY, message);
            }
        }
    }
    out
}

fn first_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_message),
        serde_json::Value::Null => None,
        serde_json::Value::Object(_) => None,
        other => Some(other.to_string()),
    }
}
