//! Startup: connect collaborators, build `AppState`, start the job log.

use std::sync::Arc;

use tracing::{info, warn};

use issuescan_core::Config;
use issuescan_github::GithubClient;
use issuescan_scan::job_log;
use issuescan_scan::ScanOptions;
use issuescan_storage::PgIssueCache;

use crate::state::AppState;

/// Build `AppState` from configuration. Fails if PostgreSQL is unreachable
/// or its migrations cannot be applied.
pub async fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let github = GithubClient::new(&config.github)?;
    info!(api_url = %config.github.api_url, per_page = config.github.per_page, "GitHub client ready");

    if !config.postgres.is_configured() {
        warn!(
            host = %config.postgres.host,
            "neither DATABASE_URL nor PG_USERNAME set, connecting with local defaults"
        );
    }
    let pool = issuescan_storage::connect(&config.postgres).await?;
    info!("PostgreSQL issue cache ready");

    Ok(Arc::new(AppState::new(
        Arc::new(github),
        Arc::new(PgIssueCache::new(pool)),
        ScanOptions::from_config(config),
    )))
}

/// Append every finished job to the history file for as long as the
/// server runs.
pub fn start_job_log(config: &Config, state: &AppState) {
    job_log::spawn_job_log(&state.jobs, config.scan.data_dir.clone());
    info!(
        path = %job_log::log_path(&config.scan.data_dir).display(),
        "scan history log enabled"
    );
}
