use std::sync::Arc;

use issuescan_github::IssueSource;
use issuescan_scan::{JobManager, JobStore, ScanOptions, ScanSupervisor};
use issuescan_storage::IssueCache;

/// Shared handles every request handler sees.
pub struct AppState {
    pub jobs: Arc<JobManager>,
    pub scans: ScanSupervisor,
}

impl AppState {
    /// Wire a fresh job store, manager and supervisor over the given
    /// collaborators.
    pub fn new(
        source: Arc<dyn IssueSource>,
        cache: Arc<dyn IssueCache>,
        options: ScanOptions,
    ) -> Self {
        let jobs = Arc::new(JobManager::new(Arc::new(JobStore::new())));
        let scans = ScanSupervisor::new(jobs.clone(), source, cache, options);
        Self { jobs, scans }
    }
}
