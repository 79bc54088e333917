//! Asynchronous repository scan jobs.
//!
//! - [`JobStore`]: in-memory job records, guarded status transitions
//! - [`JobManager`]: create / transition / look up jobs, job-updated events
//! - [`executor`]: the ingestion steps a single scan runs
//! - [`ScanSupervisor`]: spawns one task per scan and reconciles crashed ones
//! - [`job_log`]: JSONL history of finished jobs

pub mod executor;
pub mod failure;
pub mod job;
pub mod job_log;
pub mod manager;
pub mod store;
pub mod supervisor;

pub use executor::{ScanContext, ScanRequest};
pub use failure::ScanError;
pub use job::{Job, JobEvent, JobId, JobResult, JobStatus};
pub use manager::JobManager;
pub use store::{JobStore, Transition};
pub use supervisor::{ScanOptions, ScanSupervisor};
