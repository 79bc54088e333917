//! Job lifecycle: creation, status transitions and change notification.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::job::{Job, JobEvent, JobId, JobResult, JobStatus};
use crate::store::{JobStore, Transition};

const EVENT_CAPACITY: usize = 256;

/// The only write path into the [`JobStore`].
///
/// Every applied transition is published on a broadcast channel; having no
/// subscribers is fine.
pub struct JobManager {
    store: Arc<JobStore>,
    events: broadcast::Sender<JobEvent>,
}

impl JobManager {
    pub fn new(store: Arc<JobStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    /// Register a new `pending` job and return its id.
    pub fn create_job(&self, repo: &str, owner: &str, repo_name: &str) -> JobId {
        let job = Job::new(repo, owner, repo_name);
        let id = job.id.clone();
        self.store.insert(job);
        debug!(job_id = %id, repo = %repo, "scan job created");
        id
    }

    pub fn get_job(&self, id: &JobId) -> Option<Job> {
        self.store.get(id)
    }

    pub fn list_jobs(&self) -> Vec<Job> {
        self.store.list()
    }

    /// Apply a status change. Unknown ids and illegal moves are logged and
    /// reported through the returned [`Transition`]; they never panic.
    pub fn update_job_status(
        &self,
        id: &JobId,
        status: JobStatus,
        result: Option<JobResult>,
    ) -> Transition {
        let outcome = self.store.transition(id, status, result);
        match &outcome {
            Transition::Applied { previous, job } => {
                debug!(job_id = %id, from = %previous, to = %status, "scan job transitioned");
                let _ = self.events.send(JobEvent {
                    previous: *previous,
                    job: job.clone(),
                });
            }
            Transition::UnknownJob => {
                warn!(job_id = %id, to = %status, "status update for unknown scan job ignored");
            }
            Transition::Rejected { from, to } => {
                warn!(job_id = %id, from = %from, to = %to, "illegal scan job transition ignored");
            }
        }
        outcome
    }

    /// Subscribe to job-updated notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Resolve once the job is `completed` or `failed`. `None` if the id is
    /// unknown.
    pub async fn wait_for_terminal(&self, id: &JobId) -> Option<Job> {
        // Subscribe before reading so a transition in between is not missed.
        let mut rx = self.events.subscribe();
        loop {
            let job = self.store.get(id)?;
            if job.status.is_terminal() {
                return Some(job);
            }
            match rx.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return self.store.get(id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn manager() -> JobManager {
        JobManager::new(Arc::new(JobStore::new()))
    }

    #[test]
    fn test_create_job_is_pending() {
        let m = manager();
        let id = m.create_job("acme/widgets", "acme", "widgets");
        let job = m.get_job(&id).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.repo, "acme/widgets");
        assert_eq!(job.owner, "acme");
        assert_eq!(job.repo_name, "widgets");
        assert!(job.result.is_none());
    }

    #[test]
    fn test_get_job_never_created() {
        let m = manager();
        assert!(m.get_job(&JobId::generate()).is_none());
    }

    #[test]
    fn test_update_unknown_job_is_noop() {
        let m = manager();
        let outcome = m.update_job_status(&JobId::from("job_0_ghost"), JobStatus::Failed, None);
        assert_eq!(outcome, Transition::UnknownJob);
        assert!(m.list_jobs().is_empty());
    }

    #[test]
    fn test_update_publishes_event() {
        let m = manager();
        let mut rx = m.subscribe();
        let id = m.create_job("acme/widgets", "acme", "widgets");

        m.update_job_status(&id, JobStatus::InProgress, None);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.previous, JobStatus::Pending);
        assert_eq!(event.job.status, JobStatus::InProgress);
        assert_eq!(event.job.id, id);
    }

    #[test]
    fn test_rejected_update_publishes_nothing() {
        let m = manager();
        let id = m.create_job("acme/widgets", "acme", "widgets");
        let mut rx = m.subscribe();

        let outcome = m.update_job_status(&id, JobStatus::Completed, None);
        assert!(matches!(outcome, Transition::Rejected { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_update_without_subscribers() {
        let m = manager();
        let id = m.create_job("acme/widgets", "acme", "widgets");
        let outcome = m.update_job_status(&id, JobStatus::InProgress, None);
        assert!(matches!(outcome, Transition::Applied { .. }));
    }

    #[tokio::test]
    async fn test_wait_for_terminal() {
        let m = Arc::new(manager());
        let id = m.create_job("acme/widgets", "acme", "widgets");

        let waiter = {
            let m = m.clone();
            let id = id.clone();
            tokio::spawn(async move { m.wait_for_terminal(&id).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        m.update_job_status(&id, JobStatus::InProgress, None);
        m.update_job_status(&id, JobStatus::Completed, Some(JobResult::no_open_issues()));

        let job = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.unwrap().issues_fetched, Some(0));
    }

    #[tokio::test]
    async fn test_wait_for_terminal_unknown() {
        let m = manager();
        assert!(m.wait_for_terminal(&JobId::from("job_0_none")).await.is_none());
    }
}
