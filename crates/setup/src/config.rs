use std::path::PathBuf;
use std::time::Duration;

use jobfair_core::types::DbId;

/// Errors from reading [`SetupConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Setup client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Base URL of the job-fair API, including its prefix.
    pub api_url: String,
    pub job_fair_id: DbId,
    pub company_id: DbId,
    /// JSON file holding the client storage (token and current step).
    pub state_file: PathBuf,
    /// Bearer token; when absent it is read from the state file.
    pub token: Option<String>,
    pub request_timeout_secs: u64,
}

impl SetupConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                     |
    /// |--------------------------------|-----------------------------|
    /// | `JOBFAIR_API_URL`              | `http://localhost:8000/api` |
    /// | `JOBFAIR_JOB_FAIR_ID`          | required                    |
    /// | `JOBFAIR_COMPANY_ID`           | required                    |
    /// | `JOBFAIR_STATE_FILE`           | `.jobfair/state.json`       |
    /// | `JOBFAIR_TOKEN`                | unset                       |
    /// | `JOBFAIR_REQUEST_TIMEOUT_SECS` | `30`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = var("JOBFAIR_API_URL").unwrap_or_else(|| "http://localhost:8000/api".into());

        let job_fair_id = parse_id(
            "JOBFAIR_JOB_FAIR_ID",
            var("JOBFAIR_JOB_FAIR_ID").ok_or(ConfigError::Missing("JOBFAIR_JOB_FAIR_ID"))?,
        )?;
        let company_id = parse_id(
            "JOBFAIR_COMPANY_ID",
            var("JOBFAIR_COMPANY_ID").ok_or(ConfigError::Missing("JOBFAIR_COMPANY_ID"))?,
        )?;

        let state_file = var("JOBFAIR_STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".jobfair/state.json"));

        let token = var("JOBFAIR_TOKEN");

        let request_timeout_secs = match var("JOBFAIR_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "JOBFAIR_REQUEST_TIMEOUT_SECS",
                expected: "a whole number of seconds",
                value: raw,
            })?,
            None => 30,
        };

        Ok(Self {
            api_url,
            job_fair_id,
            company_id,
            state_file,
            token,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_id(name: &'static str, raw: String) -> Result<DbId, ConfigError> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "a positive integer",
            value: raw,
        }),
    }
}
