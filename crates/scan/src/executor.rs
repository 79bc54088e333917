//! The steps a single scan runs, start to terminal status.
//!
//! [`run_scan`] is what the supervisor spawns. It moves the job to
//! `in-progress`, runs [`ingest`], and records the outcome as exactly one
//! terminal transition.

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use tracing::{error, info, warn};

use issuescan_github::{IssuePaginator, IssueSource, RepositoryInfo};
use issuescan_storage::IssueCache;

use crate::failure::ScanError;
use crate::job::{JobId, JobResult, JobStatus};
use crate::manager::JobManager;
use crate::store::Transition;

/// Sole message a scan task receives.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub job_id: JobId,
    /// `owner/name`.
    pub repo: String,
    pub owner: String,
    pub repo_name: String,
}

/// Shared collaborators every scan task holds a handle to.
pub struct ScanContext {
    pub manager: Arc<JobManager>,
    pub source: Arc<dyn IssueSource>,
    pub cache: Arc<dyn IssueCache>,
    pub per_page: u8,
}

/// Run one scan to completion.
pub async fn run_scan(ctx: Arc<ScanContext>, req: ScanRequest) {
    let start = Instant::now();

    match ctx
        .manager
        .update_job_status(&req.job_id, JobStatus::InProgress, None)
    {
        Transition::Applied { .. } => {}
        other => {
            warn!(job_id = %req.job_id, outcome = ?other, "scan job could not start");
            return;
        }
    }
    info!(job_id = %req.job_id, repo = %req.repo, "scan started");

    let (status, result) = match ingest(&ctx, &req).await {
        Ok(result) => {
            info!(
                job_id = %req.job_id,
                repo = %req.repo,
                issues = ?result.issues_fetched,
                cached = ?result.cached_successfully,
                duration_ms = start.elapsed().as_millis() as u64,
                "scan completed"
            );
            (JobStatus::Completed, result)
        }
        Err(e) => {
            let message = e.failure_message();
            error!(
                job_id = %req.job_id,
                repo = %req.repo,
                error = %e,
                duration_ms = start.elapsed().as_millis() as u64,
                "scan failed: {}",
                message
            );
            (JobStatus::Failed, JobResult::failed(message))
        }
    };

    ctx.manager
        .update_job_status(&req.job_id, status, Some(result));
}

/// Metadata, cache check, then the paginated walk and one bulk write.
async fn ingest(ctx: &ScanContext, req: &ScanRequest) -> Result<JobResult, ScanError> {
    let info = ctx
        .source
        .get_repository(&req.owner, &req.repo_name)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                return ScanError::RepositoryNotFound(req.repo.clone());
            }
            if e.is_forbidden() {
                warn!(job_id = %req.job_id, repo = %req.repo, "repository not accessible with current token");
            }
            ScanError::Github(e)
        })?;

    // GitHub resolves names case-insensitively; the cache is keyed on its spelling.
    let (owner, name) = canonical_coordinates(&info, req);

    if let Some(cached) = ctx.cache.find_repository(owner, name).await? {
        info!(
            job_id = %req.job_id,
            repo = %info.full_name,
            cached_issues = cached.issue_count,
            "repository already cached, skipping fetch"
        );
        return Ok(JobResult::already_cached());
    }

    let mut paginator = IssuePaginator::new(ctx.source.as_ref(), owner, name, ctx.per_page);
    // Page-number walks over a live listing can repeat an entry across pages.
    let mut issues = IndexMap::new();
    let mut pull_requests = 0usize;
    let mut repeated = 0usize;
    while let Some(entries) = paginator.next_page().await? {
        for entry in entries {
            if entry.is_pull_request() {
                pull_requests += 1;
            } else if issues.contains_key(&entry.id) {
                repeated += 1;
            } else {
                issues.insert(entry.id, entry.into_new_issue());
            }
        }
    }
    info!(
        job_id = %req.job_id,
        repo = %info.full_name,
        pages = paginator.pages_fetched(),
        issues = issues.len(),
        skipped_pull_requests = pull_requests,
        repeated_entries = repeated,
        "issue listing fetched"
    );

    if issues.is_empty() {
        return Ok(JobResult::no_open_issues());
    }

    let saved = ctx
        .cache
        .create_repository_with_issues(owner, name, issues.into_values().collect())
        .await?;
    Ok(JobResult::cached(saved.issue_count))
}

/// `owner` and `name` as GitHub spells them, falling back to the request.
fn canonical_coordinates<'a>(info: &'a RepositoryInfo, req: &'a ScanRequest) -> (&'a str, &'a str) {
    match info.full_name.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => (owner, name),
        _ => (req.owner.as_str(), req.repo_name.as_str()),
    }
}
