//! Shared fixtures for setup workflow tests: a scripted in-memory backend
//! and form builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use jobfair_client::Created;
use jobfair_core::interview_slot::{InterviewSlot, InterviewSlotForm};
use jobfair_core::job_fair::JobFair;
use jobfair_core::job_profile::{JobProfile, JobProfileForm, TrackInput};
use jobfair_core::participation::{
    ParticipationForm, ParticipationPayload, ParticipationRecord, ParticipationStatus,
};
use jobfair_core::speaker::{SpeakerForm, SpeakerRecord};
use jobfair_core::storage::MemoryStorage;
use jobfair_core::types::DbId;
use jobfair_setup::{RemoteError, SetupBackend, SetupWorkflow, StepPersistence};

pub const JOB_FAIR_ID: DbId = 4;
pub const COMPANY_ID: DbId = 12;
pub const PARTICIPATION_ID: DbId = 55;

#[derive(Debug)]
struct Script {
    job_fair: Option<JobFair>,
    participation: Option<ParticipationRecord>,
    participate_status: ParticipationStatus,
    failures: VecDeque<RemoteError>,
    stall_next_slot: bool,
    calls: Vec<&'static str>,
    next_id: DbId,
}

/// Backend that answers from an in-memory script and records every call.
///
/// Clones share the same script so a test can keep a handle after moving
/// one into the workflow.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// A fair on 2025-03-10..11, 09:00 to 17:00, with no participation yet.
    pub fn new() -> Self {
        let fair = JobFair {
            id: JOB_FAIR_ID,
            title: "Spring Fair".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(17, 0, 0),
            location: None,
        };
        Self {
            script: Arc::new(Mutex::new(Script {
                job_fair: Some(fair),
                participation: None,
                participate_status: ParticipationStatus::Pending,
                failures: VecDeque::new(),
                stall_next_slot: false,
                calls: Vec::new(),
                next_id: 900,
            })),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    /// The server already holds a participation for the company.
    pub fn with_participation(self, status: ParticipationStatus, need_branding: bool) -> Self {
        self.script().participation = Some(record(status, need_branding));
        self
    }

    /// Status returned by the next `participate` call.
    pub fn participate_status(self, status: ParticipationStatus) -> Self {
        self.script().participate_status = status;
        self
    }

    pub fn without_job_fair(self) -> Self {
        self.script().job_fair = None;
        self
    }

    /// The organiser approves the stored participation.
    pub fn approve(&self) {
        if let Some(p) = self.script().participation.as_mut() {
            p.status = ParticipationStatus::Approved;
        }
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: RemoteError) {
        self.script().failures.push_back(err);
    }

    /// The next `create_interview_slot` call never answers.
    pub fn stall_next_slot(&self) {
        self.script().stall_next_slot = true;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.script().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.script().calls.iter().filter(|c| **c == call).count()
    }

    fn enter(&self, call: &'static str) -> Result<MutexGuard<'_, Script>, RemoteError> {
        let mut script = self.script();
        script.calls.push(call);
        match script.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(script),
        }
    }

    fn created(&self, call: &'static str) -> Result<Created, RemoteError> {
        let mut script = self.enter(call)?;
        script.next_id += 1;
        Ok(Created {
            id: Some(script.next_id),
            message: None,
        })
    }
}

#[async_trait]
impl SetupBackend for ScriptedBackend {
    async fn job_fair(&self, _job_fair_id: DbId) -> Result<JobFair, RemoteError> {
        let script = self.enter("job_fair")?;
        script
            .job_fair
            .clone()
            .ok_or_else(|| RemoteError::Network("not found".into()))
    }

    async fn participate(
        &self,
        _job_fair_id: DbId,
        payload: &ParticipationPayload,
    ) -> Result<ParticipationRecord, RemoteError> {
        let mut script = self.enter("participate")?;
        let mut created = record(script.participate_status, payload.need_branding);
        created.company_id = payload.company_id;
        created.special_requirements = payload.special_requirements.clone();
        script.participation = Some(created.clone());
        Ok(created)
    }

    async fn find_participation(
        &self,
        _job_fair_id: DbId,
        company_id: DbId,
    ) -> Result<Option<ParticipationRecord>, RemoteError> {
        let script = self.enter("find_participation")?;
        Ok(script
            .participation
            .clone()
            .filter(|p| p.company_id == company_id))
    }

    async fn create_interview_slot(
        &self,
        _job_fair_id: DbId,
        _participation_id: DbId,
        _slot: &InterviewSlot,
    ) -> Result<Created, RemoteError> {
        let stall = std::mem::take(&mut self.script().stall_next_slot);
        if stall {
            std::future::pending::<()>().await;
        }
        self.created("create_interview_slot")
    }

    async fn create_speaker(
        &self,
        _job_fair_id: DbId,
        _participation_id: DbId,
        _speaker: &SpeakerRecord,
    ) -> Result<Created, RemoteError> {
        self.created("create_speaker")
    }

    async fn create_job_profile(
        &self,
        _job_fair_id: DbId,
        _participation_id: DbId,
        _profile: &JobProfile,
    ) -> Result<Created, RemoteError> {
        self.created("create_job_profile")
    }
}

pub fn record(status: ParticipationStatus, need_branding: bool) -> ParticipationRecord {
    ParticipationRecord {
        participation_id: PARTICIPATION_ID,
        company_id: COMPANY_ID,
        special_requirements: None,
        need_branding,
        status,
    }
}

/// A workflow over `backend` and `storage`, not yet initialized.
pub fn workflow(
    backend: &ScriptedBackend,
    storage: &Arc<MemoryStorage>,
) -> SetupWorkflow<ScriptedBackend> {
    SetupWorkflow::new(
        backend.clone(),
        StepPersistence::new(storage.clone()),
        JOB_FAIR_ID,
        COMPANY_ID,
    )
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

pub fn participation_form(need_branding: bool) -> ParticipationForm {
    ParticipationForm {
        company_id: 0,
        special_requirements: Some("Two tables near the entrance".into()),
        need_branding,
    }
}

pub fn slot_form() -> InterviewSlotForm {
    InterviewSlotForm {
        slot_date: "2025-03-10".into(),
        start_time: "10:00".into(),
        end_time: "12:00".into(),
        duration_minutes: 30,
        max_interviews_per_slot: 2,
        ..InterviewSlotForm::default()
    }
}

pub fn speaker_form() -> SpeakerForm {
    SpeakerForm {
        speaker_name: "Dana Reyes".into(),
        position: "Head of Talent".into(),
        mobile: "+201001234567".into(),
        photo_url: None,
    }
}

pub fn profile_form(title: &str) -> JobProfileForm {
    JobProfileForm {
        title: title.into(),
        description: "Build and run the platform".into(),
        requirements: "Two years of experience".into(),
        employment_type: "full_time".into(),
        location: "Cairo".into(),
        positions_available: 2,
        tracks: vec![TrackInput {
            track_id: 1,
            preference_level: "required".into(),
        }],
    }
}
