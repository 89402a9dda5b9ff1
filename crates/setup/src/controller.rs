//! The participation setup workflow.
//!
//! [`SetupWorkflow`] ties the guarded [`WorkflowState`] to the remote API
//! and to client storage. A session looks like:
//!
//! 1. [`SetupWorkflow::new`] seeds the current step from storage.
//! 2. [`SetupWorkflow::initialize`] loads the fair window and the
//!    company's participation, moves to the step the server agrees with,
//!    and locks the workflow.
//! 3. The `submit_*` methods validate locally, call the API, and feed the
//!    result into the state machine. Every move is written back to
//!    storage.
//!
//! Failures leave the current step alone and are kept as a [`Notice`]
//! for display.

use serde::Serialize;

use jobfair_client::Created;
use jobfair_core::error::CoreError;
use jobfair_core::interview_slot::{InterviewSlot, InterviewSlotForm};
use jobfair_core::job_fair::JobFairWindow;
use jobfair_core::job_profile::{JobProfile, JobProfileForm};
use jobfair_core::participation::{ParticipationForm, ParticipationRecord, ParticipationStatus};
use jobfair_core::setup_step::SetupStep;
use jobfair_core::speaker::{SpeakerForm, SpeakerRecord};
use jobfair_core::types::DbId;
use jobfair_core::validation::{FieldErrors, FormModel};
use jobfair_core::workflow_state::{Advance, Force, StepOutcome, SubmissionTicket, WorkflowState};

use crate::backend::{RemoteError, SetupBackend};
use crate::bridge::StepPersistence;

const MSG_FIX_FIELDS: &str = "Please correct the highlighted fields.";
const MSG_DECLINED: &str = "The organiser declined this participation request.";
const MSG_NOT_FOUND: &str = "No participation request was found for this company.";

// ---------------------------------------------------------------------------
// Session types
// ---------------------------------------------------------------------------

/// A record the API accepted, with the id it assigned (when returned).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Saved<T> {
    pub id: Option<DbId>,
    pub record: T,
}

/// What the user should currently be told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The participation request is stored and waits on the organiser.
    PendingApproval,
    Saved { message: String },
    /// The last action failed. `field_errors` is empty for banner-only
    /// failures.
    Error {
        message: String,
        field_errors: FieldErrors,
    },
}

/// Why a workflow action was refused or failed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Local validation failed; nothing was sent.
    #[error("The form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),

    #[error("Cannot submit {attempted} while the workflow is on step {current}")]
    WrongStep {
        attempted: SetupStep,
        current: SetupStep,
    },

    #[error("A submission for step {0} is already in progress")]
    Busy(SetupStep),

    #[error("No participation request exists for this job fair yet")]
    NoParticipation,

    #[error("A participation request was already submitted ({0})")]
    AlreadySubmitted(&'static str),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Read-only snapshot of a session for display.
#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub job_fair_id: DbId,
    pub company_id: DbId,
    pub step_number: u8,
    pub step_label: &'static str,
    pub state: &'a WorkflowState,
    pub window: Option<&'a JobFairWindow>,
    pub participation: Option<&'a ParticipationRecord>,
    pub interview_slots: &'a [Saved<InterviewSlot>],
    pub speakers: &'a [Saved<SpeakerRecord>],
    pub job_profiles: &'a [Saved<JobProfile>],
    pub notice: Option<&'a Notice>,
}

// ---------------------------------------------------------------------------
// SetupWorkflow
// ---------------------------------------------------------------------------

pub struct SetupWorkflow<B> {
    backend: B,
    bridge: StepPersistence,
    job_fair_id: DbId,
    company_id: DbId,
    state: WorkflowState,
    window: Option<JobFairWindow>,
    participation: Option<ParticipationRecord>,
    slots: Vec<Saved<InterviewSlot>>,
    speakers: Vec<Saved<SpeakerRecord>>,
    job_profiles: Vec<Saved<JobProfile>>,
    notice: Option<Notice>,
}

impl<B: SetupBackend> SetupWorkflow<B> {
    /// Create a session for `company_id` in `job_fair_id`, seeded from
    /// the step held in storage. The workflow is unlocked until
    /// [`Self::initialize`] succeeds.
    pub fn new(backend: B, bridge: StepPersistence, job_fair_id: DbId, company_id: DbId) -> Self {
        let seeded = bridge.load();
        tracing::debug!(job_fair_id, company_id, step = %seeded, "Seeded setup workflow from storage");
        Self {
            backend,
            bridge,
            job_fair_id,
            company_id,
            state: WorkflowState::seeded(seeded),
            window: None,
            participation: None,
            slots: Vec::new(),
            speakers: Vec::new(),
            job_profiles: Vec::new(),
            notice: None,
        }
    }

    // ---- accessors ----

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn current_step(&self) -> SetupStep {
        self.state.current_step()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn participation(&self) -> Option<&ParticipationRecord> {
        self.participation.as_ref()
    }

    pub fn window(&self) -> Option<&JobFairWindow> {
        self.window.as_ref()
    }

    pub fn interview_slots(&self) -> &[Saved<InterviewSlot>] {
        &self.slots
    }

    pub fn speakers(&self) -> &[Saved<SpeakerRecord>] {
        &self.speakers
    }

    pub fn job_profiles(&self) -> &[Saved<JobProfile>] {
        &self.job_profiles
    }

    pub fn view(&self) -> SessionView<'_> {
        let step = self.state.current_step();
        SessionView {
            job_fair_id: self.job_fair_id,
            company_id: self.company_id,
            step_number: step.to_number(),
            step_label: step.label(),
            state: &self.state,
            window: self.window.as_ref(),
            participation: self.participation.as_ref(),
            interview_slots: &self.slots,
            speakers: &self.speakers,
            job_profiles: &self.job_profiles,
            notice: self.notice.as_ref(),
        }
    }

    // ---- load ----

    /// Reconcile the stored step with the server and lock the workflow.
    ///
    /// - No participation: step 1.
    /// - Pending or rejected participation: step 1 with a notice.
    /// - Approved participation: the stored step, but never before step 2
    ///   and never on the branding step when branding was not requested.
    ///
    /// A failed participation lookup leaves the workflow unlocked on the
    /// seeded step so a later call can retry.
    pub async fn initialize(&mut self) -> Result<SetupStep, SubmitError> {
        let stored = self.state.current_step();

        match self.backend.job_fair(self.job_fair_id).await {
            Ok(fair) => self.window = Some(fair.window()),
            Err(e) => {
                tracing::warn!(
                    job_fair_id = self.job_fair_id,
                    error = %e,
                    "Could not load job fair window, slot dates are left to the server",
                );
            }
        }

        let participation = match self
            .backend
            .find_participation(self.job_fair_id, self.company_id)
            .await
        {
            Ok(participation) => participation,
            Err(e) => {
                self.notice = Some(error_notice(&e));
                return Err(e.into());
            }
        };

        let target = match &participation {
            Some(record) if record.status.is_approved() => {
                self.state.set_needs_branding(record.need_branding);
                let mut target = stored.max(SetupStep::InterviewSlots);
                if target == SetupStep::BrandingSpeakers && !record.need_branding {
                    target = SetupStep::JobProfiles;
                }
                for step in SetupStep::ALL {
                    if step < target && (step != SetupStep::BrandingSpeakers || record.need_branding) {
                        self.state.mark_completed(step);
                    }
                }
                self.notice = None;
                target
            }
            Some(record) => {
                self.state.set_needs_branding(record.need_branding);
                self.notice = Some(status_notice(record.status));
                SetupStep::Participation
            }
            None => {
                self.notice = None;
                SetupStep::Participation
            }
        };
        self.participation = participation;

        self.state.reconcile(target, Force::Yes)?;
        self.state.lock();
        self.bridge.save(target);

        tracing::info!(
            job_fair_id = self.job_fair_id,
            company_id = self.company_id,
            stored = %stored,
            step = %target,
            "Setup workflow reconciled with server",
        );
        Ok(target)
    }

    // ---- step 1 ----

    /// Send the participation request.
    ///
    /// A `company_id` of zero in the form is filled with the session's
    /// company. Moves to step 2 only if the server approves immediately;
    /// otherwise the workflow waits on step 1 with
    /// [`Notice::PendingApproval`].
    pub async fn submit_participation(
        &mut self,
        form: &ParticipationForm,
    ) -> Result<Advance, SubmitError> {
        self.require_step(SetupStep::Participation)?;
        if let Some(existing) = &self.participation {
            if existing.status != ParticipationStatus::Rejected {
                return Err(SubmitError::AlreadySubmitted(existing.status.as_str()));
            }
        }

        let mut form = form.clone();
        if form.company_id == 0 {
            form.company_id = self.company_id;
        }
        let payload = self.validated(&form)?;

        let ticket = self.begin()?;
        match self.backend.participate(self.job_fair_id, &payload).await {
            Ok(record) => {
                self.state.set_needs_branding(record.need_branding);
                let status = record.status;
                tracing::info!(
                    job_fair_id = self.job_fair_id,
                    participation_id = record.participation_id,
                    status = status.as_str(),
                    "Participation request submitted",
                );
                self.participation = Some(record);
                self.apply_status(ticket, status)
            }
            Err(e) => Err(self.fail(ticket, e)),
        }
    }

    /// Re-read the participation status while waiting on step 1.
    pub async fn refresh_approval(&mut self) -> Result<Advance, SubmitError> {
        self.require_step(SetupStep::Participation)?;

        let ticket = self.begin()?;
        match self
            .backend
            .find_participation(self.job_fair_id, self.company_id)
            .await
        {
            Ok(Some(record)) => {
                self.state.set_needs_branding(record.need_branding);
                let status = record.status;
                self.participation = Some(record);
                self.apply_status(ticket, status)
            }
            Ok(None) => {
                self.close(ticket, StepOutcome::Failed(MSG_NOT_FOUND.to_string()));
                self.notice = Some(Notice::Error {
                    message: MSG_NOT_FOUND.to_string(),
                    field_errors: FieldErrors::new(),
                });
                Err(SubmitError::NoParticipation)
            }
            Err(e) => Err(self.fail(ticket, e)),
        }
    }

    // ---- steps 2 to 4 ----

    /// Save an interview slot. The slot must lie within the fair's window
    /// when the window is known.
    pub async fn submit_interview_slot(
        &mut self,
        form: &InterviewSlotForm,
    ) -> Result<Advance, SubmitError> {
        self.require_step(SetupStep::InterviewSlots)?;
        let participation_id = self.participation_id()?;
        let built = form.build_within(self.window.as_ref());
        let slot = match built {
            Ok(slot) => slot,
            Err(errors) => return Err(self.invalid(errors)),
        };

        let ticket = self.begin()?;
        match self
            .backend
            .create_interview_slot(self.job_fair_id, participation_id, &slot)
            .await
        {
            Ok(created) => {
                self.slots.push(Saved {
                    id: created.id,
                    record: slot,
                });
                self.confirm(ticket, created, "Interview slot saved.")
            }
            Err(e) => Err(self.fail(ticket, e)),
        }
    }

    pub async fn submit_speaker(&mut self, form: &SpeakerForm) -> Result<Advance, SubmitError> {
        self.require_step(SetupStep::BrandingSpeakers)?;
        let participation_id = self.participation_id()?;
        let speaker = self.validated(form)?;

        let ticket = self.begin()?;
        match self
            .backend
            .create_speaker(self.job_fair_id, participation_id, &speaker)
            .await
        {
            Ok(created) => {
                self.speakers.push(Saved {
                    id: created.id,
                    record: speaker,
                });
                self.confirm(ticket, created, "Speaker saved.")
            }
            Err(e) => Err(self.fail(ticket, e)),
        }
    }

    /// Save a job profile. Step 4 accepts any number of profiles; each
    /// one is appended and the workflow stays on step 4.
    pub async fn submit_job_profile(
        &mut self,
        form: &JobProfileForm,
    ) -> Result<Advance, SubmitError> {
        self.require_step(SetupStep::JobProfiles)?;
        let participation_id = self.participation_id()?;
        let profile = self.validated(form)?;

        let ticket = self.begin()?;
        match self
            .backend
            .create_job_profile(self.job_fair_id, participation_id, &profile)
            .await
        {
            Ok(created) => {
                self.job_profiles.push(Saved {
                    id: created.id,
                    record: profile,
                });
                self.confirm(ticket, created, "Job profile saved.")
            }
            Err(e) => Err(self.fail(ticket, e)),
        }
    }

    /// Forget the stored step and start over on step 1. The server is
    /// not contacted.
    pub fn reset(&mut self) {
        self.bridge.clear();
        self.state = WorkflowState::new();
        self.participation = None;
        self.slots.clear();
        self.speakers.clear();
        self.job_profiles.clear();
        self.notice = None;
        tracing::info!(job_fair_id = self.job_fair_id, "Setup workflow reset");
    }

    // ---- private helpers ----

    fn require_step(&self, attempted: SetupStep) -> Result<(), SubmitError> {
        let current = self.state.current_step();
        if current != attempted {
            return Err(SubmitError::WrongStep { attempted, current });
        }
        Ok(())
    }

    fn participation_id(&self) -> Result<DbId, SubmitError> {
        self.participation
            .as_ref()
            .map(|p| p.participation_id)
            .ok_or(SubmitError::NoParticipation)
    }

    fn validated<F: FormModel>(&mut self, form: &F) -> Result<F::Payload, SubmitError> {
        form.build().map_err(|errors| self.invalid(errors))
    }

    fn invalid(&mut self, errors: FieldErrors) -> SubmitError {
        tracing::debug!(step = %self.state.current_step(), fields = errors.len(), "Form failed validation");
        self.notice = Some(Notice::Error {
            message: MSG_FIX_FIELDS.to_string(),
            field_errors: errors.clone(),
        });
        SubmitError::Invalid(errors)
    }

    fn begin(&mut self) -> Result<SubmissionTicket, SubmitError> {
        let step = self.state.current_step();
        self.state
            .begin_submission()
            .map_err(|_| SubmitError::Busy(step))
    }

    /// Feed `outcome` into the state machine and persist any move.
    fn finish(
        &mut self,
        ticket: SubmissionTicket,
        outcome: StepOutcome,
    ) -> Result<Advance, SubmitError> {
        let advance = self.state.finish_submission(ticket, outcome)?;
        match &advance {
            Advance::Moved { from, to } => {
                self.bridge.save(*to);
                tracing::info!(job_fair_id = self.job_fair_id, from = %from, to = %to, "Setup step advanced");
            }
            Advance::Discarded { step } => {
                tracing::warn!(job_fair_id = self.job_fair_id, step = %step, "Discarded response for a step no longer current");
            }
            Advance::Stayed { .. } => {}
        }
        Ok(advance)
    }

    /// Release the ticket when the outcome cannot move the workflow.
    fn close(&mut self, ticket: SubmissionTicket, outcome: StepOutcome) {
        if let Err(e) = self.finish(ticket, outcome) {
            tracing::error!(error = %e, "Could not release submission");
        }
    }

    fn confirm(
        &mut self,
        ticket: SubmissionTicket,
        created: Created,
        default_message: &str,
    ) -> Result<Advance, SubmitError> {
        let advance = self.finish(ticket, StepOutcome::Confirmed)?;
        if !matches!(advance, Advance::Discarded { .. }) {
            self.notice = Some(Notice::Saved {
                message: created
                    .message
                    .unwrap_or_else(|| default_message.to_string()),
            });
        }
        Ok(advance)
    }

    fn apply_status(
        &mut self,
        ticket: SubmissionTicket,
        status: ParticipationStatus,
    ) -> Result<Advance, SubmitError> {
        let outcome = match status {
            ParticipationStatus::Approved => StepOutcome::Confirmed,
            ParticipationStatus::Pending => StepOutcome::AwaitingApproval,
            ParticipationStatus::Rejected => StepOutcome::Failed(MSG_DECLINED.to_string()),
        };
        let advance = self.finish(ticket, outcome)?;
        if !matches!(advance, Advance::Discarded { .. }) {
            self.notice = Some(status_notice(status));
        }
        Ok(advance)
    }

    fn fail(&mut self, ticket: SubmissionTicket, err: RemoteError) -> SubmitError {
        tracing::warn!(
            job_fair_id = self.job_fair_id,
            step = %ticket.step(),
            error = %err,
            "Setup submission failed",
        );
        self.close(ticket, StepOutcome::Failed(err.to_string()));
        self.notice = Some(error_notice(&err));
        SubmitError::Remote(err)
    }
}

fn status_notice(status: ParticipationStatus) -> Notice {
    match status {
        ParticipationStatus::Approved => Notice::Saved {
            message: "Participation approved.".to_string(),
        },
        ParticipationStatus::Pending => Notice::PendingApproval,
        ParticipationStatus::Rejected => Notice::Error {
            message: MSG_DECLINED.to_string(),
            field_errors: FieldErrors::new(),
        },
    }
}

fn error_notice(err: &RemoteError) -> Notice {
    Notice::Error {
        message: err.to_string(),
        field_errors: err.field_errors().cloned().unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
