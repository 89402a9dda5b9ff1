//! Branding speaker (step 3) form and record.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidationError;

use crate::validation::{not_blank, optional_text, FieldErrors, FormModel};

/// International or local phone number: optional `+`, then 7 to 15 digits.
/// Spaces and dashes are stripped before matching.
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("valid regex"));

/// Strip the separators people type into phone numbers.
pub fn normalize_mobile(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

fn valid_mobile(value: &str) -> Result<(), ValidationError> {
    if MOBILE_RE.is_match(&normalize_mobile(value)) {
        return Ok(());
    }
    let mut err = ValidationError::new("mobile");
    err.message = Some("Enter a valid mobile number (7 to 15 digits)".into());
    Err(err)
}

/// A registered branding speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerRecord {
    pub speaker_name: String,
    pub position: String,
    pub mobile: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// User input for one branding speaker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, validator::Validate)]
pub struct SpeakerForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub speaker_name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Position must be at most 255 characters")
    )]
    pub position: String,
    #[validate(custom(function = "valid_mobile"))]
    pub mobile: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl FormModel for SpeakerForm {
    type Payload = SpeakerRecord;

    fn build(&self) -> Result<SpeakerRecord, FieldErrors> {
        let mut errors = match validator::Validate::validate(self) {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        let photo_url = optional_text(self.photo_url.as_deref());
        if let Some(url) = &photo_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                errors.add("photo_url", "Photo must be an http(s) URL");
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(SpeakerRecord {
            speaker_name: self.speaker_name.trim().to_string(),
            position: self.position.trim().to_string(),
            mobile: normalize_mobile(&self.mobile),
            photo_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MSG_REQUIRED;

    fn form() -> SpeakerForm {
        SpeakerForm {
            speaker_name: " Dana Reyes ".into(),
            position: "Head of Talent".into(),
            mobile: "+20 100-123-4567".into(),
            photo_url: None,
        }
    }

    #[test]
    fn valid_form_is_normalized() {
        let record = form().to_payload().unwrap();
        assert_eq!(record.speaker_name, "Dana Reyes");
        assert_eq!(record.mobile, "+201001234567");
        assert_eq!(record.photo_url, None);
    }

    #[test]
    fn blank_name_and_position_are_required() {
        let errors = SpeakerForm {
            speaker_name: "  ".into(),
            position: String::new(),
            ..form()
        }
        .validate();
        assert_eq!(errors.get("speaker_name"), Some(MSG_REQUIRED));
        assert_eq!(errors.get("position"), Some(MSG_REQUIRED));
    }

    #[test]
    fn malformed_mobile_is_reported() {
        for mobile in ["", "12345", "phone", "+1234567890123456"] {
            let errors = SpeakerForm {
                mobile: mobile.into(),
                ..form()
            }
            .validate();
            assert!(errors.contains("mobile"), "accepted {mobile:?}");
        }
    }

    #[test]
    fn photo_url_must_be_http() {
        let errors = SpeakerForm {
            photo_url: Some("ftp://cdn/photo.png".into()),
            ..form()
        }
        .validate();
        assert!(errors.contains("photo_url"));

        let ok = SpeakerForm {
            photo_url: Some("https://cdn.example.com/dana.png".into()),
            ..form()
        };
        assert!(ok.validate().is_empty());
    }
}
