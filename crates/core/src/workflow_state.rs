//! Guarded state machine for the participation setup wizard.
//!
//! [`WorkflowState`] owns the current step, the set of server-confirmed
//! steps, the one-way lock, and the branding branch flag. Every change to
//! the current step goes through [`WorkflowState::advance`] or
//! [`WorkflowState::reconcile`], which enforce that a locked workflow
//! never moves backwards unless the caller passes [`Force::Yes`].
//!
//! Submissions are bracketed by [`WorkflowState::begin_submission`] and
//! [`WorkflowState::finish_submission`] so a double submit for the same
//! step is refused and a response for a step the user already left is
//! dropped. A ticket that is dropped without being finished, for example
//! because the request future was cancelled, releases its step as well.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::error::CoreError;
use crate::setup_step::SetupStep;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How the server answered a step submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The server accepted the submission.
    Confirmed,
    /// The participation was stored but is not approved yet.
    AwaitingApproval,
    /// The submission failed; the message is shown to the user.
    Failed(String),
}

/// Whether a transition may move a locked workflow backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Force {
    No,
    /// Only used while reconciling with the server after a reload.
    Yes,
}

/// Why the workflow stayed on its step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StayReason {
    /// A repeatable step accepted another submission.
    Repeatable,
    /// Participation is waiting on organiser approval. Not an error.
    PendingApproval,
    /// The submission failed and must be resubmitted by the user.
    Failed(String),
}

/// Result of feeding an outcome into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { from: SetupStep, to: SetupStep },
    Stayed { step: SetupStep, reason: StayReason },
    /// The response belonged to a step that is no longer current.
    Discarded { step: SetupStep },
}

impl Advance {
    /// The step the workflow is on after this result, if it changed.
    pub fn moved_to(&self) -> Option<SetupStep> {
        match self {
            Advance::Moved { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// Proof that a submission for `step` was started.
///
/// Hand it back to [`WorkflowState::finish_submission`] to apply the
/// outcome. Dropping it releases the re-entrancy guard without touching
/// the current step.
#[derive(Debug)]
#[must_use = "a submission ticket must be finished to apply its outcome"]
pub struct SubmissionTicket {
    step: SetupStep,
    in_flight: InFlight,
}

impl SubmissionTicket {
    pub fn step(&self) -> SetupStep {
        self.step
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.in_flight.steps().remove(&self.step);
    }
}

/// Steps with an outstanding submission, shared with their tickets.
#[derive(Debug, Default)]
struct InFlight(Arc<Mutex<BTreeSet<SetupStep>>>);

impl InFlight {
    fn steps(&self) -> MutexGuard<'_, BTreeSet<SetupStep>> {
        // The set stays consistent even if a holder panicked.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn handle(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// A cloned state gets its own set; tickets keep pointing at the original.
impl Clone for InFlight {
    fn clone(&self) -> Self {
        Self(Arc::new(Mutex::new(self.steps().clone())))
    }
}

impl PartialEq for InFlight {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.steps() == *other.steps()
    }
}

impl Eq for InFlight {}

// ---------------------------------------------------------------------------
// WorkflowState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowState {
    current_step: SetupStep,
    completed_steps: BTreeSet<SetupStep>,
    locked: bool,
    needs_branding: bool,
    #[serde(skip)]
    in_flight: InFlight,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::seeded(SetupStep::Participation)
    }
}

impl WorkflowState {
    /// Fresh, unlocked state on the first step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlocked state starting at a step restored from client storage.
    pub fn seeded(step: SetupStep) -> Self {
        Self {
            current_step: step,
            completed_steps: BTreeSet::new(),
            locked: false,
            needs_branding: false,
            in_flight: InFlight::default(),
        }
    }

    pub fn current_step(&self) -> SetupStep {
        self.current_step
    }

    pub fn completed_steps(&self) -> &BTreeSet<SetupStep> {
        &self.completed_steps
    }

    pub fn is_completed(&self, step: SetupStep) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn needs_branding(&self) -> bool {
        self.needs_branding
    }

    pub fn set_needs_branding(&mut self, needs_branding: bool) {
        self.needs_branding = needs_branding;
    }

    /// Whether a submission for `step` is outstanding.
    pub fn is_submitting(&self, step: SetupStep) -> bool {
        self.in_flight.steps().contains(&step)
    }

    /// Forbid backward moves from now on (except forced ones).
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Record that `step` was confirmed by the server without moving.
    ///
    /// Used while reconciling: steps before the restored one are known to
    /// have been completed in an earlier session.
    pub fn mark_completed(&mut self, step: SetupStep) {
        self.completed_steps.insert(step);
    }

    // ---- transitions ----

    /// Move directly to `target`.
    ///
    /// Refused with [`CoreError::InvalidTransition`] when the workflow is
    /// locked, `target` is behind the current step, and `force` is
    /// [`Force::No`].
    pub fn reconcile(&mut self, target: SetupStep, force: Force) -> Result<Advance, CoreError> {
        self.check_move(target, force)?;
        let from = self.current_step;
        if from == target {
            return Ok(Advance::Stayed {
                step: from,
                reason: StayReason::Repeatable,
            });
        }
        self.current_step = target;
        Ok(Advance::Moved { from, to: target })
    }

    /// Apply the outcome of a submission made on `step`.
    ///
    /// - `Confirmed` marks `step` completed and moves to the step that
    ///   follows it given the branding flag.
    /// - `AwaitingApproval` and `Failed` leave the current step alone.
    pub fn advance(
        &mut self,
        step: SetupStep,
        outcome: StepOutcome,
        force: Force,
    ) -> Result<Advance, CoreError> {
        match outcome {
            StepOutcome::Confirmed => {
                let next = step.next_after_confirmed(self.needs_branding);
                self.check_move(next, force)?;
                self.completed_steps.insert(step);
                let from = self.current_step;
                if next == from {
                    return Ok(Advance::Stayed {
                        step: from,
                        reason: StayReason::Repeatable,
                    });
                }
                self.current_step = next;
                Ok(Advance::Moved { from, to: next })
            }
            StepOutcome::AwaitingApproval => Ok(Advance::Stayed {
                step: self.current_step,
                reason: StayReason::PendingApproval,
            }),
            StepOutcome::Failed(message) => Ok(Advance::Stayed {
                step: self.current_step,
                reason: StayReason::Failed(message),
            }),
        }
    }

    // ---- submissions ----

    /// Start a submission on the current step.
    ///
    /// Refused with [`CoreError::Conflict`] while a previous submission
    /// for the same step has not finished.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, CoreError> {
        let step = self.current_step;
        if !self.in_flight.steps().insert(step) {
            return Err(CoreError::Conflict(format!(
                "A submission for step {step} is already in progress"
            )));
        }
        Ok(SubmissionTicket {
            step,
            in_flight: self.in_flight.handle(),
        })
    }

    /// Finish a submission started with [`Self::begin_submission`].
    ///
    /// The guard for the ticket's step is released in every case. When
    /// the workflow has moved off that step in the meantime, the outcome
    /// is discarded.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: StepOutcome,
    ) -> Result<Advance, CoreError> {
        self.in_flight.steps().remove(&ticket.step);
        if ticket.step != self.current_step {
            return Ok(Advance::Discarded { step: ticket.step });
        }
        self.advance(ticket.step, outcome, Force::No)
    }

    fn check_move(&self, target: SetupStep, force: Force) -> Result<(), CoreError> {
        if self.locked && force == Force::No && target < self.current_step {
            return Err(CoreError::InvalidTransition {
                from: self.current_step,
                to: target,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
