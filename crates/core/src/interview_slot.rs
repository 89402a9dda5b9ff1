//! Interview slot (step 2) form and typed slot.
//!
//! A slot is either an interview window (with a per-interview duration,
//! a capacity, and an availability flag) or a break with a reason. The
//! typed [`InterviewSlot`] makes "a break that is available" impossible to
//! build; the wire format still carries `is_break`/`is_available` because
//! that is what the API stores.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::job_fair::{parse_date, parse_time, time_field, JobFairWindow};
use crate::validation::{optional_text, FieldErrors, FormModel, MSG_REQUIRED};

/// Shortest interview a slot may schedule, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 5;

/// Longest interview a slot may schedule, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 240;

/// Upper bound on parallel interviews in one slot.
pub const MAX_INTERVIEWS_PER_SLOT: u32 = 50;

// ---------------------------------------------------------------------------
// Typed slot
// ---------------------------------------------------------------------------

/// What a slot is used for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SlotKind {
    Interviews {
        duration_minutes: u32,
        max_interviews_per_slot: u32,
        available: bool,
    },
    Break {
        reason: String,
    },
}

/// A validated interview slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SlotWire", try_from = "SlotWire")]
pub struct InterviewSlot {
    slot_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    kind: SlotKind,
}

impl InterviewSlot {
    pub fn slot_date(&self) -> NaiveDate {
        self.slot_date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn is_break(&self) -> bool {
        matches!(self.kind, SlotKind::Break { .. })
    }

    pub fn is_available(&self) -> bool {
        matches!(self.kind, SlotKind::Interviews { available: true, .. })
    }
}

/// Flat representation exchanged with the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotWire {
    slot_date: NaiveDate,
    #[serde(deserialize_with = "time_field")]
    start_time: NaiveTime,
    #[serde(deserialize_with = "time_field")]
    end_time: NaiveTime,
    #[serde(default)]
    duration_minutes: u32,
    #[serde(default)]
    max_interviews_per_slot: u32,
    #[serde(default)]
    is_break: bool,
    #[serde(default)]
    break_reason: Option<String>,
    #[serde(default)]
    is_available: bool,
}

impl From<InterviewSlot> for SlotWire {
    fn from(slot: InterviewSlot) -> Self {
        let (duration_minutes, max_interviews_per_slot, is_available, break_reason) =
            match slot.kind {
                SlotKind::Interviews {
                    duration_minutes,
                    max_interviews_per_slot,
                    available,
                } => (duration_minutes, max_interviews_per_slot, available, None),
                SlotKind::Break { reason } => (0, 0, false, Some(reason)),
            };
        Self {
            slot_date: slot.slot_date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            duration_minutes,
            max_interviews_per_slot,
            is_break: break_reason.is_some(),
            break_reason,
            is_available,
        }
    }
}

impl TryFrom<SlotWire> for InterviewSlot {
    type Error = String;

    fn try_from(wire: SlotWire) -> Result<Self, Self::Error> {
        if wire.start_time >= wire.end_time {
            return Err("slot start_time must be before end_time".to_string());
        }
        let kind = match (wire.is_break, wire.is_available) {
            (true, true) => {
                return Err("a slot cannot be both a break and available".to_string());
            }
            (true, false) => SlotKind::Break {
                reason: wire.break_reason.unwrap_or_default(),
            },
            (false, available) => SlotKind::Interviews {
                duration_minutes: wire.duration_minutes,
                max_interviews_per_slot: wire.max_interviews_per_slot,
                available,
            },
        };
        Ok(Self {
            slot_date: wire.slot_date,
            start_time: wire.start_time,
            end_time: wire.end_time,
            kind,
        })
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// User input for one interview slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSlotForm {
    pub slot_date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub max_interviews_per_slot: u32,
    #[serde(default)]
    pub is_break: bool,
    #[serde(default)]
    pub break_reason: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Default for InterviewSlotForm {
    fn default() -> Self {
        Self {
            slot_date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            duration_minutes: 30,
            max_interviews_per_slot: 1,
            is_break: false,
            break_reason: None,
            is_available: true,
        }
    }
}

impl InterviewSlotForm {
    /// Mark the slot as a break. Breaks are never available.
    pub fn set_break(&mut self, is_break: bool) {
        self.is_break = is_break;
        if is_break {
            self.is_available = false;
        }
    }

    /// Mark the slot as available. Available slots are never breaks.
    pub fn set_available(&mut self, is_available: bool) {
        self.is_available = is_available;
        if is_available {
            self.is_break = false;
        }
    }

    /// Validate against the fair's published window as well as the
    /// structural rules, and build the slot.
    pub fn build_within(&self, window: Option<&JobFairWindow>) -> Result<InterviewSlot, FieldErrors> {
        let mut errors = FieldErrors::new();

        let date = required(&mut errors, "slot_date", &self.slot_date, parse_date);
        let start = required(&mut errors, "start_time", &self.start_time, parse_time);
        let end = required(&mut errors, "end_time", &self.end_time, parse_time);

        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                errors.add("end_time", "End time must be after start time");
            }
        }

        if self.is_break && self.is_available {
            errors.add(
                "is_available",
                "A break cannot be available for interviews",
            );
        }

        let kind = if self.is_break {
            match optional_text(self.break_reason.as_deref()) {
                Some(reason) => Some(SlotKind::Break { reason }),
                None => {
                    errors.add("break_reason", "A reason is required for breaks");
                    None
                }
            }
        } else {
            self.check_interview_fields(&mut errors, start, end);
            Some(SlotKind::Interviews {
                duration_minutes: self.duration_minutes,
                max_interviews_per_slot: self.max_interviews_per_slot,
                available: self.is_available,
            })
        };

        if let Some(window) = window {
            if let Some(date) = date {
                if !window.contains_date(date) {
                    errors.add(
                        "slot_date",
                        format!(
                            "Date must be between {} and {}",
                            window.start_date, window.end_date
                        ),
                    );
                }
            }
            if let (Some(start), Some(end)) = (start, end) {
                if !window.contains_times(start, end) {
                    errors.add("start_time", "Slot must fall within the job fair hours");
                }
            }
        }

        match (date, start, end, kind) {
            (Some(slot_date), Some(start_time), Some(end_time), Some(kind)) if errors.is_empty() => {
                Ok(InterviewSlot {
                    slot_date,
                    start_time,
                    end_time,
                    kind,
                })
            }
            _ => Err(errors),
        }
    }

    fn check_interview_fields(
        &self,
        errors: &mut FieldErrors,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            errors.add(
                "duration_minutes",
                format!(
                    "Duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes"
                ),
            );
        } else if let (Some(start), Some(end)) = (start, end) {
            if start < end && (end - start).num_minutes() < i64::from(self.duration_minutes) {
                errors.add(
                    "duration_minutes",
                    "Duration is longer than the slot itself",
                );
            }
        }

        if !(1..=MAX_INTERVIEWS_PER_SLOT).contains(&self.max_interviews_per_slot) {
            errors.add(
                "max_interviews_per_slot",
                format!("Must be between 1 and {MAX_INTERVIEWS_PER_SLOT}"),
            );
        }
    }
}

impl FormModel for InterviewSlotForm {
    type Payload = InterviewSlot;

    fn build(&self) -> Result<InterviewSlot, FieldErrors> {
        self.build_within(None)
    }
}

/// Parse a required text field, recording a message when blank or invalid.
fn required<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    parse: impl Fn(&str) -> Result<T, crate::error::CoreError>,
) -> Option<T> {
    if value.trim().is_empty() {
        errors.add(field, MSG_REQUIRED);
        return None;
    }
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}
