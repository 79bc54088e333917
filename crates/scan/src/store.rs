//! In-memory store for scan jobs.

use std::sync::RwLock;

use chrono::Utc;
use indexmap::IndexMap;

use crate::job::{Job, JobId, JobResult, JobStatus};

/// What happened to a requested status change.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Applied; carries the job as it is now.
    Applied { previous: JobStatus, job: Job },
    UnknownJob,
    /// Not a legal forward move; the job is unchanged.
    Rejected { from: JobStatus, to: JobStatus },
}

/// Single owner of every [`Job`] in the process.
///
/// Uses `IndexMap` to keep creation order (newest last) with O(1) lookup.
/// The lock is only held for the duration of a map operation and never
/// across an `.await`. Entries are never evicted.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<IndexMap<JobId, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        let mut jobs = self.jobs.write().unwrap();
        jobs.insert(job.id.clone(), job);
    }

    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.read().unwrap().get(id).cloned()
    }

    pub fn list(&self) -> Vec<Job> {
        self.jobs.read().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move a job to `status`, refresh `updated_at`, and replace the result
    /// when one is given. The status, timestamp and result change together
    /// under one write lock.
    pub fn transition(&self, id: &JobId, status: JobStatus, result: Option<JobResult>) -> Transition {
        let mut jobs = self.jobs.write().unwrap();
        let Some(job) = jobs.get_mut(id) else {
            return Transition::UnknownJob;
        };

        let previous = job.status;
        if !previous.can_advance_to(status) {
            return Transition::Rejected { from: previous, to: status };
        }

        job.status = status;
        job.updated_at = Utc::now();
        if let Some(result) = result {
            job.result = Some(result);
        }

        Transition::Applied {
            previous,
            job: job.clone(),
        }
    }
}
