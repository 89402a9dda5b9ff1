//! REST client for the job-fair backend.
//!
//! Wraps the participation endpoints (job fair lookup, participation
//! request and status, interview slots, speakers, job profiles) using
//! [`reqwest`], injecting the bearer token and unwrapping the
//! `{ data, message, errors }` response envelope.

pub mod api;
pub mod envelope;
pub mod error;

pub use api::{Created, JobFairApi};
pub use error::ApiError;
