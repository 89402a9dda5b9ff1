//! Participation request (step 1) form and record.
//!
//! A company asks to take part in a job fair, optionally listing special
//! requirements and whether it wants a branding slot. The organiser
//! approves the request server-side; the workflow only reads the status.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::DbId;
use crate::validation::{optional_text, FieldErrors, FormModel};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Approval status of a participation, owned by the remote API.
///
/// Decoding goes through [`ParticipationStatus::parse`], so casing and
/// surrounding whitespace in API responses are tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ParticipationStatus {
    /// Parse a status string as reported by the API.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid participation status '{other}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_approved(&self) -> bool {
        *self == Self::Approved
    }
}

impl<'de> Deserialize<'de> for ParticipationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A company's participation in one job fair, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    #[serde(alias = "id")]
    pub participation_id: DbId,
    pub company_id: DbId,
    #[serde(default)]
    pub special_requirements: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub need_branding: bool,
    pub status: ParticipationStatus,
}

/// Accept `true`/`false`, `0`/`1` and `"0"`/`"1"` for boolean flags.
///
/// The API serialises tinyint columns as numbers on some endpoints.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        serde_json::Value::String(s) => match s.as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid boolean flag '{other}'"))),
        },
        serde_json::Value::Null => Ok(false),
        other => Err(D::Error::custom(format!("invalid boolean flag {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// User input for the participation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, validator::Validate)]
pub struct ParticipationForm {
    #[validate(range(min = 1, message = "A company must be selected"))]
    pub company_id: DbId,
    #[validate(length(
        max = 1000,
        message = "Special requirements must be at most 1000 characters"
    ))]
    #[serde(default)]
    pub special_requirements: Option<String>,
    #[serde(default)]
    pub need_branding: bool,
}

/// Body of `POST /job-fairs/{id}/participate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipationPayload {
    pub company_id: DbId,
    pub special_requirements: Option<String>,
    pub need_branding: bool,
}

impl FormModel for ParticipationForm {
    type Payload = ParticipationPayload;

    fn build(&self) -> Result<ParticipationPayload, FieldErrors> {
        validator::Validate::validate(self).map_err(FieldErrors::from)?;
        Ok(ParticipationPayload {
            company_id: self.company_id,
            special_requirements: optional_text(self.special_requirements.as_deref()),
            need_branding: self.need_branding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- status --

    #[test]
    fn status_parse_valid() {
        assert_eq!(
            ParticipationStatus::parse("approved").unwrap(),
            ParticipationStatus::Approved
        );
        assert_eq!(
            ParticipationStatus::parse(" Pending ").unwrap(),
            ParticipationStatus::Pending
        );
    }

    #[test]
    fn status_parse_invalid() {
        assert!(ParticipationStatus::parse("maybe").is_err());
        assert!(ParticipationStatus::parse("").is_err());
    }

    #[test]
    fn status_as_str_roundtrip() {
        for status in [
            ParticipationStatus::Pending,
            ParticipationStatus::Approved,
            ParticipationStatus::Rejected,
        ] {
            assert_eq!(ParticipationStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    // -- record --

    #[test]
    fn record_accepts_numeric_branding_flag() {
        let record: ParticipationRecord = serde_json::from_value(json!({
            "id": 12,
            "company_id": 7,
            "need_branding": 1,
            "status": "pending"
        }))
        .unwrap();
        assert_eq!(record.participation_id, 12);
        assert!(record.need_branding);
        assert_eq!(record.special_requirements, None);
    }

    #[test]
    fn record_accepts_float_branding_flag() {
        for (flag, expected) in [(json!(1.0), true), (json!(0.0), false), (json!(0.5), true)] {
            let record: ParticipationRecord = serde_json::from_value(json!({
                "id": 12,
                "company_id": 7,
                "need_branding": flag,
                "status": "pending"
            }))
            .unwrap();
            assert_eq!(record.need_branding, expected);
        }
    }

    #[test]
    fn record_status_tolerates_api_casing() {
        let record: ParticipationRecord = serde_json::from_value(json!({
            "id": 12,
            "company_id": 7,
            "status": "Approved"
        }))
        .unwrap();
        assert_eq!(record.status, ParticipationStatus::Approved);
        assert!(!record.need_branding);

        let err = serde_json::from_value::<ParticipationRecord>(json!({
            "id": 12,
            "company_id": 7,
            "status": "maybe"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Invalid participation status 'maybe'"));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ParticipationStatus::Rejected).unwrap(),
            json!("rejected")
        );
    }

    #[test]
    fn record_rejects_unknown_flag_text() {
        let result: Result<ParticipationRecord, _> = serde_json::from_value(json!({
            "participation_id": 1,
            "company_id": 7,
            "need_branding": "sometimes",
            "status": "approved"
        }));
        assert!(result.is_err());
    }

    // -- form --

    #[test]
    fn valid_form_builds_payload() {
        let form = ParticipationForm {
            company_id: 7,
            special_requirements: Some("  Power outlet near booth ".into()),
            need_branding: true,
        };
        let payload = form.to_payload().unwrap();
        assert_eq!(
            payload.special_requirements.as_deref(),
            Some("Power outlet near booth")
        );
        assert!(payload.need_branding);
    }

    #[test]
    fn blank_requirements_become_null() {
        let form = ParticipationForm {
            company_id: 7,
            special_requirements: Some("   ".into()),
            need_branding: false,
        };
        let payload = serde_json::to_value(form.to_payload().unwrap()).unwrap();
        assert!(payload["special_requirements"].is_null());
    }

    #[test]
    fn missing_company_is_reported() {
        let form = ParticipationForm::default();
        let errors = form.validate();
        assert!(errors.contains("company_id"));
    }

    #[test]
    fn overlong_requirements_are_reported() {
        let form = ParticipationForm {
            company_id: 1,
            special_requirements: Some("x".repeat(1001)),
            need_branding: false,
        };
        assert!(form.validate().contains("special_requirements"));
    }
}
