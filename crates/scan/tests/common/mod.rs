//! In-memory collaborators for scan tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use issuescan_core::{CachedRepository, NewIssue, RepoName};
use issuescan_github::{
    GithubError, IssueEntry, IssuePage, IssueSource, RateLimit, RepositoryInfo,
};
use issuescan_scan::{Job, JobId, JobManager, JobStatus, JobStore, ScanOptions, ScanSupervisor};
use issuescan_storage::{IssueCache, StorageError};

// ── Builders ─────────────────────────────────────────────────────────

pub fn issue(id: i64, title: &str) -> IssueEntry {
    IssueEntry {
        id,
        number: id as u64,
        title: title.to_string(),
        body: Some(format!("body of {}", title)),
        html_url: format!("https://github.com/acme/widgets/issues/{}", id),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        pull_request: None,
    }
}

pub fn pull_request(id: i64, title: &str) -> IssueEntry {
    IssueEntry {
        html_url: format!("https://github.com/acme/widgets/pull/{}", id),
        pull_request: Some(serde_json::json!({"url": "https://api.github.com/pulls"})),
        ..issue(id, title)
    }
}

pub fn rate_limited() -> GithubError {
    GithubError::Api {
        status: 403,
        message: "API rate limit exceeded for 10.0.0.1.".to_string(),
        rate_limit: RateLimit {
            limit: Some(60),
            remaining: Some(0),
            reset: Some(1_700_000_000),
        },
    }
}

pub fn not_found() -> GithubError {
    GithubError::Api {
        status: 404,
        message: "Not Found".to_string(),
        rate_limit: RateLimit::default(),
    }
}

// ── GitHub ───────────────────────────────────────────────────────────

/// How the fake should break a call.
#[derive(Clone)]
pub enum Fault {
    RateLimited,
    Network,
    Api(u16, &'static str),
    Panic(&'static str),
}

impl Fault {
    fn raise(&self) -> GithubError {
        match self {
            Self::RateLimited => rate_limited(),
            Self::Network => GithubError::Network("connection refused".to_string()),
            Self::Api(status, message) => GithubError::Api {
                status: *status,
                message: message.to_string(),
                rate_limit: RateLimit::default(),
            },
            Self::Panic(msg) => panic!("{}", msg),
        }
    }
}

/// Serves configured repositories page by page. Names match
/// case-insensitively, as on GitHub. Unknown repositories are 404.
#[derive(Default)]
pub struct FakeGithub {
    repos: Mutex<HashMap<String, Vec<Vec<IssueEntry>>>>,
    metadata_fault: Mutex<Option<Fault>>,
    listing_fault: Mutex<Option<Fault>>,
    /// When set, each listing call waits for a permit (never returned).
    gate: Mutex<Option<Arc<Semaphore>>>,
    listing_calls: Mutex<Vec<(String, u32, u8)>>,
}

impl FakeGithub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(self, full_name: &str, pages: Vec<Vec<IssueEntry>>) -> Self {
        self.repos.lock().unwrap().insert(full_name.to_string(), pages);
        self
    }

    pub fn fail_metadata(self, fault: Fault) -> Self {
        *self.metadata_fault.lock().unwrap() = Some(fault);
        self
    }

    pub fn fail_listing(self, fault: Fault) -> Self {
        *self.listing_fault.lock().unwrap() = Some(fault);
        self
    }

    pub fn gated(self, gate: Arc<Semaphore>) -> Self {
        *self.gate.lock().unwrap() = Some(gate);
        self
    }

    pub fn listing_calls(&self) -> Vec<(String, u32, u8)> {
        self.listing_calls.lock().unwrap().clone()
    }

    /// Configured spelling and pages of `owner/name`.
    fn lookup(&self, owner: &str, name: &str) -> Option<(String, Vec<Vec<IssueEntry>>)> {
        let wanted = format!("{}/{}", owner, name);
        self.repos
            .lock()
            .unwrap()
            .iter()
            .find(|(full_name, _)| full_name.eq_ignore_ascii_case(&wanted))
            .map(|(full_name, pages)| (full_name.clone(), pages.clone()))
    }
}

#[async_trait]
impl IssueSource for FakeGithub {
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryInfo, GithubError> {
        let fault = self.metadata_fault.lock().unwrap().clone();
        if let Some(fault) = fault {
            return Err(fault.raise());
        }

        match self.lookup(owner, name) {
            Some((full_name, pages)) => Ok(RepositoryInfo {
                id: 1,
                html_url: format!("https://github.com/{}", full_name),
                private: false,
                open_issues_count: pages.iter().map(|p| p.len() as u64).sum(),
                full_name,
            }),
            None => Err(not_found()),
        }
    }

    async fn list_issues_page(
        &self,
        owner: &str,
        name: &str,
        page: u32,
        per_page: u8,
    ) -> Result<IssuePage, GithubError> {
        let full_name = format!("{}/{}", owner, name);
        self.listing_calls
            .lock()
            .unwrap()
            .push((full_name, page, per_page));

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let fault = self.listing_fault.lock().unwrap().clone();
        if let Some(fault) = fault {
            return Err(fault.raise());
        }

        let (_, pages) = self.lookup(owner, name).ok_or_else(not_found)?;
        let index = page.saturating_sub(1) as usize;
        let entries = pages.get(index).cloned().unwrap_or_default();
        let next_page = if index + 1 < pages.len() { Some(page + 1) } else { None };
        Ok(IssuePage { entries, next_page })
    }
}

// ── Cache ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeCache {
    repos: Mutex<HashMap<String, CachedRepository>>,
    /// Every bulk write: repository and the issues it carried.
    pub writes: Mutex<Vec<(String, Vec<NewIssue>)>>,
    write_fault: Mutex<Option<(Option<&'static str>, &'static str)>>,
    lookup_fault: Mutex<Option<&'static str>>,
}

impl FakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the bulk write fail. `code: Some(..)` yields a known-shape fault.
    pub fn fail_writes(self, code: Option<&'static str>, message: &'static str) -> Self {
        *self.write_fault.lock().unwrap() = Some((code, message));
        self
    }

    /// Make the cached-repository lookup fail with an unknown-shape fault.
    pub fn fail_lookups(self, message: &'static str) -> Self {
        *self.lookup_fault.lock().unwrap() = Some(message);
        self
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl IssueCache for FakeCache {
    async fn find_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<CachedRepository>, StorageError> {
        if let Some(message) = *self.lookup_fault.lock().unwrap() {
            return Err(StorageError::Unknown(message.to_string()));
        }
        let key = format!("{}/{}", owner, name);
        Ok(self.repos.lock().unwrap().get(&key).cloned())
    }

    async fn create_repository_with_issues(
        &self,
        owner: &str,
        name: &str,
        issues: Vec<NewIssue>,
    ) -> Result<CachedRepository, StorageError> {
        if let Some((code, message)) = *self.write_fault.lock().unwrap() {
            return Err(match code {
                Some(code) => StorageError::Known {
                    code: code.to_string(),
                    message: message.to_string(),
                },
                None => StorageError::Unknown(message.to_string()),
            });
        }

        let key = format!("{}/{}", owner, name);
        let mut repos = self.repos.lock().unwrap();
        if repos.contains_key(&key) {
            return Err(StorageError::Known {
                code: "23505".to_string(),
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }

        let record = CachedRepository {
            id: repos.len() as i64 + 1,
            owner: owner.to_string(),
            name: name.to_string(),
            issue_count: issues.len(),
            created_at: Utc::now(),
        };
        repos.insert(key.clone(), record.clone());
        self.writes.lock().unwrap().push((key, issues));
        Ok(record)
    }
}

// ── Harness ──────────────────────────────────────────────────────────

pub struct Harness {
    pub github: Arc<FakeGithub>,
    pub cache: Arc<FakeCache>,
    pub manager: Arc<JobManager>,
    pub supervisor: ScanSupervisor,
}

impl Harness {
    pub fn new(github: FakeGithub, cache: FakeCache) -> Self {
        Self::with_options(github, cache, ScanOptions::default())
    }

    pub fn with_options(github: FakeGithub, cache: FakeCache, options: ScanOptions) -> Self {
        let github = Arc::new(github);
        let cache = Arc::new(cache);
        let manager = Arc::new(JobManager::new(Arc::new(JobStore::new())));
        let supervisor =
            ScanSupervisor::new(manager.clone(), github.clone(), cache.clone(), options);
        Self {
            github,
            cache,
            manager,
            supervisor,
        }
    }

    pub fn trigger(&self, repo: &str) -> JobId {
        let repo = RepoName::parse(repo).unwrap();
        self.supervisor.trigger(&repo)
    }

    /// Wait (bounded) for the job to reach a terminal status.
    pub async fn finish(&self, id: &JobId) -> Job {
        tokio::time::timeout(Duration::from_secs(5), self.manager.wait_for_terminal(id))
            .await
            .expect("scan did not finish in time")
            .expect("job vanished")
    }

    /// Poll until the job has `status`.
    pub async fn wait_for_status(&self, id: &JobId, status: JobStatus) {
        for _ in 0..250 {
            if self.manager.get_job(id).map(|j| j.status) == Some(status) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job {} never reached {}", id, status);
    }
}
