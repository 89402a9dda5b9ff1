//! `jobfair-setup` library crate.
//!
//! The participation setup workflow: a controller that drives the four
//! setup steps against the job-fair API, mirrors progress to client
//! storage, and reconciles with the server after a reload. The binary
//! entrypoint lives in `main.rs`.

pub mod backend;
pub mod bridge;
pub mod config;
pub mod controller;

pub use backend::{RemoteError, SetupBackend};
pub use bridge::StepPersistence;
pub use controller::{Notice, Saved, SessionView, SetupWorkflow, SubmitError};
