//! Domain core for the job-fair participation setup workflow.
//!
//! Pure types and rules shared by the HTTP client and the workflow
//! controller: step identifiers, the guarded workflow state machine,
//! per-step form models with their validation, and the client-side
//! key/value storage abstraction. No network access lives here.

pub mod error;
pub mod interview_slot;
pub mod job_fair;
pub mod job_profile;
pub mod participation;
pub mod setup_step;
pub mod speaker;
pub mod storage;
pub mod types;
pub mod validation;
pub mod workflow_state;
