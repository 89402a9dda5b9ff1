//! Participation setup steps and the forward transition table.
//!
//! Defines the four wizard steps a company walks through when joining a
//! job fair, their 1-based numbering (the value mirrored to client
//! storage), and the rule that picks the next step after a step is
//! confirmed by the server.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The four steps of the participation setup wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    Participation,
    InterviewSlots,
    BrandingSpeakers,
    JobProfiles,
}

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 4;

impl SetupStep {
    /// All steps in wizard order.
    pub const ALL: [SetupStep; 4] = [
        Self::Participation,
        Self::InterviewSlots,
        Self::BrandingSpeakers,
        Self::JobProfiles,
    ];

    /// Convert a 1-based step number to a `SetupStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Participation),
            2 => Ok(Self::InterviewSlots),
            3 => Ok(Self::BrandingSpeakers),
            4 => Ok(Self::JobProfiles),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::Participation => 1,
            Self::InterviewSlots => 2,
            Self::BrandingSpeakers => 3,
            Self::JobProfiles => 4,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::Participation => "Participation Request",
            Self::InterviewSlots => "Interview Slots",
            Self::BrandingSpeakers => "Branding Speakers",
            Self::JobProfiles => "Job Profiles",
        }
    }

    /// The step that follows a server-confirmed submission on `self`.
    ///
    /// The branding step is only reachable when the participation asked
    /// for branding. Job profiles are the resting step: confirming one
    /// keeps the wizard there.
    pub fn next_after_confirmed(self, needs_branding: bool) -> SetupStep {
        match self {
            Self::Participation => Self::InterviewSlots,
            Self::InterviewSlots if needs_branding => Self::BrandingSpeakers,
            Self::InterviewSlots => Self::JobProfiles,
            Self::BrandingSpeakers => Self::JobProfiles,
            Self::JobProfiles => Self::JobProfiles,
        }
    }
}

impl std::fmt::Display for SetupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.to_number(), self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- numbering --

    #[test]
    fn step_from_number_valid() {
        assert_eq!(
            SetupStep::from_number(1).unwrap(),
            SetupStep::Participation
        );
        assert_eq!(SetupStep::from_number(4).unwrap(), SetupStep::JobProfiles);
    }

    #[test]
    fn step_from_number_invalid() {
        assert!(SetupStep::from_number(0).is_err());
        assert!(SetupStep::from_number(5).is_err());
        assert!(SetupStep::from_number(255).is_err());
    }

    #[test]
    fn step_to_number_roundtrip() {
        for n in MIN_STEP..=MAX_STEP {
            assert_eq!(SetupStep::from_number(n).unwrap().to_number(), n);
        }
    }

    #[test]
    fn ordering_follows_numbering() {
        assert!(SetupStep::Participation < SetupStep::InterviewSlots);
        assert!(SetupStep::BrandingSpeakers < SetupStep::JobProfiles);
        assert_eq!(SetupStep::ALL.len(), usize::from(MAX_STEP));
    }

    // -- transitions --

    #[test]
    fn participation_leads_to_slots() {
        for branding in [true, false] {
            assert_eq!(
                SetupStep::Participation.next_after_confirmed(branding),
                SetupStep::InterviewSlots
            );
        }
    }

    #[test]
    fn slots_branch_on_branding() {
        assert_eq!(
            SetupStep::InterviewSlots.next_after_confirmed(true),
            SetupStep::BrandingSpeakers
        );
        assert_eq!(
            SetupStep::InterviewSlots.next_after_confirmed(false),
            SetupStep::JobProfiles
        );
    }

    #[test]
    fn speakers_and_profiles_lead_to_profiles() {
        for branding in [true, false] {
            assert_eq!(
                SetupStep::BrandingSpeakers.next_after_confirmed(branding),
                SetupStep::JobProfiles
            );
            assert_eq!(
                SetupStep::JobProfiles.next_after_confirmed(branding),
                SetupStep::JobProfiles
            );
        }
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(SetupStep::BrandingSpeakers).unwrap(),
            serde_json::json!("branding_speakers")
        );
    }
}
