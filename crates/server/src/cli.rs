//! CLI argument parsing and subcommand dispatch.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use issuescan_core::{Config, RepoName};
use issuescan_scan::{job_log, Job, JobStatus, ScanSupervisor};

use crate::api::JobView;
use crate::state::AppState;
use crate::{router, startup};

/// Scan a GitHub repository's open issues into a PostgreSQL cache.
#[derive(Parser, Debug)]
#[command(name = "issuescan", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Scan one repository in-process and print the finished job as JSON.
    Scan {
        /// Repository as `owner/name`.
        repo: String,
        /// Give up waiting after this many seconds.
        #[arg(long, default_value_t = 600)]
        timeout_secs: u64,
    },
}

/// Run the parsed command.
pub async fn dispatch(config: &Config, cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Scan { repo, timeout_secs } => {
            scan_once(config, &repo, Duration::from_secs(timeout_secs)).await
        }
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = startup::build_app_state(config).await?;
    startup::start_job_log(config, &state);
    let app = router::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn scan_once(config: &Config, repo: &str, timeout: Duration) -> anyhow::Result<()> {
    let name = RepoName::parse(repo)?;
    let state = startup::build_app_state(config).await?;
    let job = scan_and_record(&state, &name, timeout, &config.scan.data_dir).await?;

    println!("{}", serde_json::to_string_pretty(&JobView::from(job.clone()))?);

    if job.status == JobStatus::Failed {
        anyhow::bail!("scan of {} failed", name);
    }
    Ok(())
}

/// Run one scan and append it to the history file before returning, so the
/// entry is on disk when the process exits.
async fn scan_and_record(
    state: &AppState,
    name: &RepoName,
    timeout: Duration,
    data_dir: &Path,
) -> anyhow::Result<Job> {
    let job = run_to_completion(&state.scans, name, timeout).await?;
    job_log::append_job_log(data_dir, &job);
    Ok(job)
}

/// Trigger a scan and wait for its terminal snapshot.
async fn run_to_completion(
    scans: &ScanSupervisor,
    name: &RepoName,
    timeout: Duration,
) -> anyhow::Result<Job> {
    let job_id = scans.trigger(name);
    info!(job_id = %job_id, repo = %name, "scan started");

    tokio::time::timeout(timeout, scans.manager().wait_for_terminal(&job_id))
        .await
        .with_context(|| format!("scan of {} did not finish within {:?}", name, timeout))?
        .with_context(|| format!("job {} disappeared", job_id))
}
