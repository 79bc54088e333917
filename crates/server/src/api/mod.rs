//! HTTP endpoints.

pub mod doc;
mod health;
mod jobs;
mod scan;

use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub use health::{health, root, HealthResponse, WELCOME};
pub use jobs::{job_get, jobs_list, JobView};
pub use scan::{scan, ScanAccepted, ScanBody};
