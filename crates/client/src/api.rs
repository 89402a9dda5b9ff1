//! HTTP client for the job-fair participation endpoints.
//!
//! Every request carries the bearer token (when one is set) and expects
//! the `{ data, message?, errors? }` envelope. A non-2xx status or an
//! envelope with `errors` is turned into an [`ApiError`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use jobfair_core::interview_slot::InterviewSlot;
use jobfair_core::job_fair::JobFair;
use jobfair_core::job_profile::JobProfile;
use jobfair_core::participation::{ParticipationPayload, ParticipationRecord};
use jobfair_core::speaker::SpeakerRecord;
use jobfair_core::types::DbId;
use jobfair_core::validation::FieldErrors;

use crate::envelope::{field_errors_from_value, Envelope};
use crate::error::ApiError;

/// HTTP client for one job-fair backend.
#[derive(Debug, Clone)]
pub struct JobFairApi {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

/// Identifier and message returned when the API creates a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: Option<DbId>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    #[serde(default)]
    id: Option<DbId>,
}

impl JobFairApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base URL including any prefix, e.g. `http://host/api`.
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, token)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (e.g. one built with a request timeout).
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_url,
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- endpoints ----

    /// `GET /job-fairs/{id}`: the fair with its published date/time window.
    pub async fn get_job_fair(&self, job_fair_id: DbId) -> Result<JobFair, ApiError> {
        let path = format!("/job-fairs/{job_fair_id}");
        let envelope = self.send::<JobFair>(self.client.get(self.url(&path)), &path).await?;
        require_data(envelope, &path)
    }

    /// `POST /job-fairs/{id}/participate`: create the participation request.
    pub async fn participate(
        &self,
        job_fair_id: DbId,
        payload: &ParticipationPayload,
    ) -> Result<ParticipationRecord, ApiError> {
        let path = format!("/job-fairs/{job_fair_id}/participate");
        let request = self.client.post(self.url(&path)).json(payload);
        let envelope = self.send::<ParticipationRecord>(request, &path).await?;
        require_data(envelope, &path)
    }

    /// `GET /job-fairs/{id}/companies`: participations and their approval status.
    pub async fn list_companies(
        &self,
        job_fair_id: DbId,
    ) -> Result<Vec<ParticipationRecord>, ApiError> {
        let path = format!("/job-fairs/{job_fair_id}/companies");
        let envelope = self
            .send::<Vec<ParticipationRecord>>(self.client.get(self.url(&path)), &path)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// The participation of `company_id` in the fair, if it exists.
    pub async fn find_participation(
        &self,
        job_fair_id: DbId,
        company_id: DbId,
    ) -> Result<Option<ParticipationRecord>, ApiError> {
        let companies = self.list_companies(job_fair_id).await?;
        Ok(companies.into_iter().find(|p| p.company_id == company_id))
    }

    /// `POST /job-fairs/{id}/participations/{pid}/interview-slots`
    pub async fn create_interview_slot(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        slot: &InterviewSlot,
    ) -> Result<Created, ApiError> {
        self.create(job_fair_id, participation_id, "interview-slots", slot)
            .await
    }

    /// `POST /job-fairs/{id}/participations/{pid}/speakers`
    pub async fn create_speaker(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        speaker: &SpeakerRecord,
    ) -> Result<Created, ApiError> {
        self.create(job_fair_id, participation_id, "speakers", speaker)
            .await
    }

    /// `POST /job-fairs/{id}/participations/{pid}/job-profiles`
    pub async fn create_job_profile(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        profile: &JobProfile,
    ) -> Result<Created, ApiError> {
        self.create(job_fair_id, participation_id, "job-profiles", profile)
            .await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn create<B: Serialize + ?Sized>(
        &self,
        job_fair_id: DbId,
        participation_id: DbId,
        collection: &str,
        body: &B,
    ) -> Result<Created, ApiError> {
        let path = format!("/job-fairs/{job_fair_id}/participations/{participation_id}/{collection}");
        let request = self.client.post(self.url(&path)).json(body);
        let envelope = self.send::<serde_json::Value>(request, &path).await?;
        let id = envelope
            .data
            .and_then(|data| serde_json::from_value::<IdOnly>(data).ok())
            .and_then(|d| d.id);
        Ok(Created {
            id,
            message: envelope.message,
        })
    }

    /// Attach auth headers, send, and unwrap the envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<Envelope<T>, ApiError> {
        let mut request = request.header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(path, "Sending job fair API request");
        let response = request.send().await?;
        let response = Self::ensure_success(response).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let envelope = Envelope::<T>::from_body(&body).map_err(|source| ApiError::Decode {
            endpoint: path.to_string(),
            source,
        })?;

        if let Some(field_errors) = envelope.field_errors() {
            tracing::warn!(path, status, "API envelope carried errors");
            return Err(ApiError::Rejected {
                status,
                message: envelope
                    .message
                    .unwrap_or_else(|| "The request was not accepted".to_string()),
                field_errors,
            });
        }
        Ok(envelope)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success; 4xx becomes [`ApiError::Rejected`]
    /// with any structured errors from the body, 5xx becomes
    /// [`ApiError::Server`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if status.is_client_error() {
            let (message, field_errors) = parse_rejection(&body);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request rejected")
                        .to_string()
                }),
                field_errors,
            });
        }

        Err(ApiError::Server {
            status: status.as_u16(),
            body,
        })
    }
}

fn require_data<T>(envelope: Envelope<T>, endpoint: &str) -> Result<T, ApiError> {
    envelope.data.ok_or_else(|| ApiError::MissingData {
        endpoint: endpoint.to_string(),
    })
}

/// Pull `message` and `errors` out of an error body, tolerating non-JSON.
fn parse_rejection(body: &str) -> (Option<String>, FieldErrors) {
    match serde_json::from_str::<Envelope<serde_json::Value>>(body) {
        Ok(envelope) => {
            let errors = envelope
                .errors
                .as_ref()
                .map(field_errors_from_value)
                .unwrap_or_default();
            (envelope.message, errors)
        }
        Err(_) => {
            let trimmed = body.trim();
            ((!trimmed.is_empty()).then(|| trimmed.to_string()), FieldErrors::new())
        }
    }
}
