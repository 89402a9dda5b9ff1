//! Field-scoped validation results shared by every setup form.
//!
//! A form reports problems as a [`FieldErrors`] map (field name to a
//! displayable message). An empty map means the form is valid. Simple
//! per-field rules come from `validator` derives; cross-field rules are
//! written by hand and merged into the same map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::error::CoreError;

/// Message used for required fields left empty or whitespace-only.
pub const MSG_REQUIRED: &str = "This field is required";

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// Ordered mapping of field name to the first message reported for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            if let Some(first) = errs.first() {
                out.add(field.to_string(), describe(first));
            }
        }
        out
    }
}

/// Human-readable text for a single `validator` error.
fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value ({})", error.code),
    }
}

// ---------------------------------------------------------------------------
// Form model contract
// ---------------------------------------------------------------------------

/// A step's form: raw user input that can be checked and turned into the
/// payload the remote API expects.
///
/// Implementors only write [`FormModel::build`]; a payload is never
/// produced from a form that fails validation.
pub trait FormModel {
    type Payload: Serialize;

    /// Validate the input and construct the typed payload.
    fn build(&self) -> Result<Self::Payload, FieldErrors>;

    /// Field-scoped problems with the current input. Empty means valid.
    fn validate(&self) -> FieldErrors {
        self.build().err().unwrap_or_default()
    }

    /// The request body for this step.
    fn to_payload(&self) -> Result<Self::Payload, CoreError> {
        self.build().map_err(CoreError::InvalidForm)
    }
}

// ---------------------------------------------------------------------------
// Shared field rules
// ---------------------------------------------------------------------------

/// `validator` custom rule: reject empty or whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(MSG_REQUIRED.into());
        return Err(err);
    }
    Ok(())
}

/// Trimmed optional text; blank input becomes `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
