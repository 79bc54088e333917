//! Scan job records and their status machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identifier ───────────────────────────────────────────────────────

/// Opaque job handle: `job_<unix millis>_<random hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Mint a fresh id. The random half is a full v4 UUID, so collisions
    /// are negligible even for ids minted in the same millisecond.
    pub fn generate() -> Self {
        Self(format!(
            "job_{}_{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Legal moves: pending → in-progress → completed | failed.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Result ───────────────────────────────────────────────────────────

/// Outcome attached to a job once it reaches a terminal status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_fetched: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_successfully: Option<bool>,
    /// Informational notice on a successful run (e.g. already cached).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobResult {
    pub const ALREADY_CACHED: &'static str = "Repository already cached";

    /// `count` issues were written to the cache.
    pub fn cached(count: usize) -> Self {
        Self {
            issues_fetched: Some(count),
            cached_successfully: Some(true),
            ..Self::default()
        }
    }

    /// The listing held no issues; nothing was written.
    pub fn no_open_issues() -> Self {
        Self {
            issues_fetched: Some(0),
            cached_successfully: Some(false),
            ..Self::default()
        }
    }

    pub fn already_cached() -> Self {
        Self {
            cached_successfully: Some(false),
            message: Some(Self::ALREADY_CACHED.to_string()),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

// ── Job ──────────────────────────────────────────────────────────────

/// One scan attempt. Values handed out by the store are snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// `owner/name`.
    pub repo: String,
    pub owner: String,
    pub repo_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
}

impl Job {
    pub fn new(repo: &str, owner: &str, repo_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::generate(),
            status: JobStatus::Pending,
            repo: repo.to_string(),
            owner: owner.to_string(),
            repo_name: repo_name.to_string(),
            created_at: now,
            updated_at: now,
            result: None,
        }
    }
}

/// Published on the job-updated channel after every applied transition.
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub previous: JobStatus,
    pub job: Job,
}
