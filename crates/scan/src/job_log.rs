//! JSONL history of finished scan jobs.
//!
//! A background task listens on the job-updated channel and appends one
//! line per terminal job to `<data_dir>/scans/jobs.jsonl`. Failures to
//! write are logged and otherwise ignored.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::job::{Job, JobId, JobStatus};
use crate::manager::JobManager;

#[derive(Serialize)]
struct JobLogEntry<'a> {
    id: &'a JobId,
    repo: &'a str,
    status: JobStatus,
    created_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    duration_ms: i64,
    issues_fetched: Option<usize>,
    cached_successfully: Option<bool>,
    message: Option<&'a str>,
    error: Option<&'a str>,
}

impl<'a> From<&'a Job> for JobLogEntry<'a> {
    fn from(job: &'a Job) -> Self {
        let result = job.result.as_ref();
        Self {
            id: &job.id,
            repo: &job.repo,
            status: job.status,
            created_at: job.created_at,
            finished_at: job.updated_at,
            duration_ms: (job.updated_at - job.created_at).num_milliseconds(),
            issues_fetched: result.and_then(|r| r.issues_fetched),
            cached_successfully: result.and_then(|r| r.cached_successfully),
            message: result.and_then(|r| r.message.as_deref()),
            error: result.and_then(|r| r.error.as_deref()),
        }
    }
}

/// Path of the history file under `data_dir`.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("scans").join("jobs.jsonl")
}

/// Start appending finished jobs to the history file. The task ends when
/// the manager is dropped.
pub fn spawn_job_log(manager: &JobManager, data_dir: PathBuf) -> JoinHandle<()> {
    let mut rx = manager.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.job.status.is_terminal() => {
                    append_job_log(&data_dir, &event.job);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "job log fell behind, entries dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("job log writer stopped");
    })
}

/// Append one job to `<data_dir>/scans/jobs.jsonl`.
pub fn append_job_log(data_dir: &Path, job: &Job) {
    let path = log_path(data_dir);
    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!(error = %e, "failed to create scan log directory");
            return;
        }
    }

    let line = match serde_json::to_string(&JobLogEntry::from(job)) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, job_id = %job.id, "failed to serialize job log entry");
            return;
        }
    };

    let mut file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "failed to open job log");
            return;
        }
    };

    if let Err(e) = writeln!(file, "{}", line) {
        warn!(error = %e, job_id = %job.id, "failed to write job log entry");
    }
}
