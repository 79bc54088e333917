//! One isolated task per scan, watched by an observer task.
//!
//! The observer awaits the scan's `JoinHandle`. If the scan panicked, was
//! cancelled, or returned while the job is still `in-progress`, the
//! observer moves the job to `failed`. The transition guard in the store
//! keeps a late observer from overwriting a terminal status the executor
//! already set.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use issuescan_core::config::Config;
use issuescan_core::RepoName;
use issuescan_github::IssueSource;
use issuescan_storage::IssueCache;

use crate::executor::{run_scan, ScanContext, ScanRequest};
use crate::job::{JobId, JobResult, JobStatus};
use crate::manager::JobManager;

const TERMINATED: &str = "Scan worker terminated unexpectedly";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Issue listing page size (1..=100).
    pub per_page: u8,
    /// Cap on scans running at once. `None` is unbounded.
    pub max_concurrent: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            per_page: 100,
            max_concurrent: None,
        }
    }
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            per_page: config.github.per_page,
            max_concurrent: config.scan.max_concurrent,
        }
    }
}

/// Creates jobs and spawns their scans. Cheap to clone.
#[derive(Clone)]
pub struct ScanSupervisor {
    ctx: Arc<ScanContext>,
    limiter: Option<Arc<Semaphore>>,
}

impl ScanSupervisor {
    pub fn new(
        manager: Arc<JobManager>,
        source: Arc<dyn IssueSource>,
        cache: Arc<dyn IssueCache>,
        options: ScanOptions,
    ) -> Self {
        let limiter = options
            .max_concurrent
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));

        Self {
            ctx: Arc::new(ScanContext {
                manager,
                source,
                cache,
                per_page: options.per_page.clamp(1, 100),
            }),
            limiter,
        }
    }

    pub fn manager(&self) -> &Arc<JobManager> {
        &self.ctx.manager
    }

    /// Register a `pending` job for `repo` and start its scan in the
    /// background. Returns as soon as the task is spawned.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self, repo: &RepoName) -> JobId {
        let full_name = repo.full_name();
        let job_id = self
            .ctx
            .manager
            .create_job(&full_name, repo.owner(), repo.name());

        let request = ScanRequest {
            job_id: job_id.clone(),
            repo: full_name,
            owner: repo.owner().to_string(),
            repo_name: repo.name().to_string(),
        };

        tokio::spawn(supervise(self.ctx.clone(), self.limiter.clone(), request));
        job_id
    }
}

async fn supervise(ctx: Arc<ScanContext>, limiter: Option<Arc<Semaphore>>, request: ScanRequest) {
    // Held until the scan task exits. The job stays `pending` while waiting.
    let _permit = match limiter {
        Some(semaphore) => semaphore.acquire_owned().await.ok(),
        None => None,
    };

    let job_id = request.job_id.clone();
    let exit = tokio::spawn(run_scan(ctx.clone(), request)).await;
    observe_exit(&ctx.manager, &job_id, exit);
}

/// Reconcile the job with how its scan task ended.
fn observe_exit(manager: &JobManager, job_id: &JobId, exit: Result<(), JoinError>) {
    let Some(job) = manager.get_job(job_id) else {
        warn!(job_id = %job_id, "scan task exited for unknown job");
        return;
    };

    match job.status {
        status if status.is_terminal() => {
            debug!(job_id = %job_id, status = %status, "scan task exited");
            return;
        }
        JobStatus::Pending => {
            error!(job_id = %job_id, "scan task exited before the job started");
            return;
        }
        _ => {}
    }

    let message = match exit {
        Err(e) if e.is_panic() => {
            let detail = panic_message(e.into_panic());
            error!(job_id = %job_id, panic = %detail, "scan task panicked");
            format!("{}: {}", TERMINATED, detail)
        }
        Err(e) => {
            error!(job_id = %job_id, error = %e, "scan task cancelled");
            TERMINATED.to_string()
        }
        Ok(()) => {
            error!(job_id = %job_id, "scan task returned without a terminal status");
            TERMINATED.to_string()
        }
    };

    manager.update_job_status(job_id, JobStatus::Failed, Some(JobResult::failed(message)));
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
