//! `jobfair-setup` -- command-line driver for the participation setup
//! workflow.
//!
//! Every invocation behaves like opening the setup page: the stored step
//! is loaded, reconciled with the server, and then one action runs. The
//! resulting session is printed as JSON.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                     |
//! |--------------------------------|----------|-----------------------------|
//! | `JOBFAIR_API_URL`              | no       | `http://localhost:8000/api` |
//! | `JOBFAIR_JOB_FAIR_ID`          | yes      | --                          |
//! | `JOBFAIR_COMPANY_ID`           | yes      | --                          |
//! | `JOBFAIR_STATE_FILE`           | no       | `.jobfair/state.json`       |
//! | `JOBFAIR_TOKEN`                | no       | token from the state file   |
//! | `JOBFAIR_REQUEST_TIMEOUT_SECS` | no       | `30`                        |

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobfair_client::JobFairApi;
use jobfair_core::storage::FileStorage;
use jobfair_setup::config::SetupConfig;
use jobfair_setup::{SetupWorkflow, StepPersistence};

#[derive(Parser)]
#[command(
    name = "jobfair-setup",
    version,
    about = "Set up a company's participation in a job fair"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile with the server and print the current step.
    Status,
    /// Send the participation request (step 1) from a JSON form file.
    Participate { form: PathBuf },
    /// Check whether a pending participation has been approved.
    Refresh,
    /// Save an interview slot (step 2) from a JSON form file.
    AddSlot { form: PathBuf },
    /// Save a branding speaker (step 3) from a JSON form file.
    AddSpeaker { form: PathBuf },
    /// Save a job profile (step 4) from a JSON form file.
    AddProfile { form: PathBuf },
    /// Store the bearer token used for API requests.
    SetToken { token: String },
    /// Forget the stored step. Nothing is sent to the server.
    Reset,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobfair_setup=info,jobfair_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = SetupConfig::from_env()?;

    let bridge = StepPersistence::new(Arc::new(FileStorage::new(&config.state_file)));

    if let Command::SetToken { token } = &cli.command {
        bridge
            .store_token(token.trim())
            .context("store bearer token")?;
        tracing::info!(state_file = %config.state_file.display(), "Bearer token stored");
        return Ok(());
    }

    let token = config.token.clone().or_else(|| bridge.token());
    if token.is_none() {
        tracing::warn!("No bearer token configured, requests will be unauthenticated");
    }
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("build HTTP client")?;
    let api = JobFairApi::with_client(http, &config.api_url, token);

    let mut workflow = SetupWorkflow::new(api, bridge, config.job_fair_id, config.company_id);

    if let Command::Reset = cli.command {
        workflow.reset();
        return print_view(&workflow);
    }

    tracing::info!(
        job_fair_id = config.job_fair_id,
        company_id = config.company_id,
        api_url = %config.api_url,
        "Starting jobfair-setup",
    );
    let loaded = workflow.initialize().await;
    if let Err(e) = loaded {
        print_view(&workflow)?;
        return Err(e).context("load setup state from the server");
    }

    let outcome = match &cli.command {
        Command::Status => Ok(()),
        Command::Participate { form } => {
            let form = read_form(form)?;
            workflow.submit_participation(&form).await.map(drop)
        }
        Command::Refresh => workflow.refresh_approval().await.map(drop),
        Command::AddSlot { form } => {
            let form = read_form(form)?;
            workflow.submit_interview_slot(&form).await.map(drop)
        }
        Command::AddSpeaker { form } => {
            let form = read_form(form)?;
            workflow.submit_speaker(&form).await.map(drop)
        }
        Command::AddProfile { form } => {
            let form = read_form(form)?;
            workflow.submit_job_profile(&form).await.map(drop)
        }
        Command::SetToken { .. } | Command::Reset => Ok(()),
    };

    print_view(&workflow)?;
    outcome?;
    Ok(())
}

fn read_form<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn print_view<B: jobfair_setup::SetupBackend>(workflow: &SetupWorkflow<B>) -> Result<()> {
    let json = serde_json::to_string_pretty(&workflow.view()).context("serialize session")?;
    println!("{json}");
    Ok(())
}
