//! Job profile (step 4) form and record.
//!
//! A job profile is a position the company offers at the fair, matched
//! to candidates through one or more tracks with a preference level.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;
use crate::validation::{not_blank, FieldErrors, FormModel};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Internship,
    Contract,
}

impl EmploymentType {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_time" => Ok(Self::FullTime),
            "part_time" => Ok(Self::PartTime),
            "internship" => Ok(Self::Internship),
            "contract" => Ok(Self::Contract),
            _ => Err(CoreError::Validation(format!(
                "Invalid employment type '{s}'. Must be one of: full_time, part_time, internship, contract"
            ))),
        }
    }
}

/// How strongly a profile wants candidates from a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceLevel {
    Required,
    Preferred,
    Acceptable,
}

impl PreferenceLevel {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "preferred" => Ok(Self::Preferred),
            "acceptable" => Ok(Self::Acceptable),
            _ => Err(CoreError::Validation(format!(
                "Invalid preference level '{s}'. Must be one of: required, preferred, acceptable"
            ))),
        }
    }
}

/// A track the profile targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPreference {
    pub track_id: DbId,
    pub preference_level: PreferenceLevel,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A validated job profile, as sent to and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProfile {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub employment_type: EmploymentType,
    pub location: String,
    pub positions_available: u32,
    pub tracks: Vec<TrackPreference>,
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// One track row in the form, still as raw input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInput {
    pub track_id: DbId,
    #[serde(default)]
    pub preference_level: String,
}

/// User input for one job profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, validator::Validate)]
pub struct JobProfileForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "not_blank"))]
    pub requirements: String,
    #[serde(default)]
    pub employment_type: String,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    #[validate(range(
        min = 1,
        max = 1000,
        message = "Positions available must be between 1 and 1000"
    ))]
    pub positions_available: u32,
    #[serde(default)]
    pub tracks: Vec<TrackInput>,
}

impl FormModel for JobProfileForm {
    type Payload = JobProfile;

    fn build(&self) -> Result<JobProfile, FieldErrors> {
        let mut errors = match validator::Validate::validate(self) {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        let employment_type = match EmploymentType::parse(&self.employment_type) {
            Ok(kind) => Some(kind),
            Err(e) => {
                errors.add("employment_type", e.to_string());
                None
            }
        };

        let tracks = parse_tracks(&self.tracks, &mut errors);

        match employment_type {
            Some(employment_type) if errors.is_empty() => Ok(JobProfile {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                requirements: self.requirements.trim().to_string(),
                employment_type,
                location: self.location.trim().to_string(),
                positions_available: self.positions_available,
                tracks,
            }),
            _ => Err(errors),
        }
    }
}

/// Validate track rows. Errors are keyed `tracks` for the list as a whole
/// and `tracks[i].field` for individual rows.
fn parse_tracks(rows: &[TrackInput], errors: &mut FieldErrors) -> Vec<TrackPreference> {
    if rows.is_empty() {
        errors.add("tracks", "Select at least one track");
        return Vec::new();
    }

    let mut seen = BTreeSet::new();
    let mut tracks = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.track_id <= 0 {
            errors.add(format!("tracks[{i}].track_id"), "Select a track");
        } else if !seen.insert(row.track_id) {
            errors.add(format!("tracks[{i}].track_id"), "Track is listed twice");
        }
        match PreferenceLevel::parse(&row.preference_level) {
            Ok(preference_level) => tracks.push(TrackPreference {
                track_id: row.track_id,
                preference_level,
            }),
            Err(e) => errors.add(format!("tracks[{i}].preference_level"), e.to_string()),
        }
    }
    tracks
}
