//! The remote collaborator seen by the setup controller.
//!
//! [`SetupBackend`] lists the calls the workflow makes. [`JobFairApi`]
//! implements it over HTTP; tests provide scripted implementations.
//! Failures are collapsed into [`RemoteError`]: either the server
//! rejected the input (shown per field) or the request did not complete
//! (shown as a banner).

use async_trait::async_trait;

use jobfair_client::{ApiError, Created, JobFairApi};
use jobfair_core::interview_slot::InterviewSlot;
use jobfair_core::job_fair::JobFair;
use jobfair_core::job_profile::JobProfile;
use jobfair_core::participation::{ParticipationPayload, ParticipationRecord};
use jobfair_core::speaker::SpeakerRecord;
use jobfair_core::types::DbId;
use jobfair_core::validation::FieldErrors;

/// Banner text for failures that are not the user's input.
pub const MSG_NETWORK: &str = "Could not reach the server. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The server refused the submission.
    #[error("{message}")]
    Rejected {
        message: String,
        field_errors: FieldErrors,
    },

    /// The request could not complete or the server failed.
    #[error("{0}")]
    Network(String),
}

impl RemoteError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            RemoteError::Rejected { field_errors, .. } => Some(field_errors),
            RemoteError::Network(_) => None,
        }
    }
}

impl From<ApiError> for RemoteError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected {
                message,
                field_errors,
                ..
            } => RemoteError::Rejected {
                message,
                field_errors,
            },
            ApiError::Request(e) => {
                tracing::warn!(error = %e, "Job fair API request failed");
                RemoteError::Network(MSG_NETWORK.to_string())
            }
            other => {
                tracing::error!(error = %other, "Job fair API returned an unusable response");
                RemoteError::Network(MSG_NETWORK.to_string())
            }
        }
    }
}

/// Calls the setup workflow makes against the job-fair API.
#[async_trait]
pub trait SetupBackend: Send + Sync {
    async fn job_fair(&self, job_fair_id: DbId) -> Result<JobFair, RemoteError>;

    async fn participate(
        &self,
        job_fair_id: DbId,
        payload: &ParticipationPayload,
    ) -> Result<ParticipationRecord, RemoteError>;

    async fn find_participation(
        &self,
        job_fair_id: DbId,
        company_id: DbId,
    ) -> Result<Option<ParticipationRecord>, RemoteError>;

    async fn create_interview_slot(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        slot: &InterviewSlot,
    ) -> Result<Created, RemoteError>;

    async fn create_speaker(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        speaker: &SpeakerRecord,
    ) -> Result<Created, RemoteError>;

    async fn create_job_profile(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        profile: &JobProfile,
    ) -> Result<Created, RemoteError>;
}

#[async_trait]
impl SetupBackend for JobFairApi {
    async fn job_fair(&self, job_fair_id: DbId) -> Result<JobFair, RemoteError> {
        Ok(self.get_job_fair(job_fair_id).await?)
    }

    async fn participate(
        &self,
        job_fair_id: DbId,
        payload: &ParticipationPayload,
    ) -> Result<ParticipationRecord, RemoteError> {
        Ok(JobFairApi::participate(self, job_fair_id, payload).await?)
    }

    async fn find_participation(
        &self,
        job_fair_id: DbId,
        company_id: DbId,
    ) -> Result<Option<ParticipationRecord>, RemoteError> {
        Ok(JobFairApi::find_participation(self, job_fair_id, company_id).await?)
    }

    async fn create_interview_slot(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        slot: &InterviewSlot,
    ) -> Result<Created, RemoteError> {
        Ok(JobFairApi::create_interview_slot(self, job_fair_id, participation_id, slot).await?)
    }

    async fn create_speaker(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        speaker: &SpeakerRecord,
    ) -> Result<Created, RemoteError> {
        Ok(JobFairApi::create_speaker(self, job_fair_id, participation_id, speaker).await?)
    }

    async fn create_job_profile(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        profile: &JobProfile,
    ) -> Result<Created, RemoteError> {
        Ok(JobFairApi::create_job_profile(self, job_fair_id, participation_id, profile).await?)
    }
}
