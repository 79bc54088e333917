//! Handlers for listing and inspecting scan jobs.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use issuescan_scan::{Job, JobId};

use crate::state::AppState;

use super::ErrorResponse;

/// Snapshot of a job as returned over HTTP.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JobView {
    pub job_id: String,
    /// `pending`, `in-progress`, `completed` or `failed`.
    pub status: String,
    pub repo: String,
    pub owner: String,
    pub repo_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present once the job is terminal.
    #[schema(value_type = Option<Object>)]
    pub result: Option<serde_json::Value>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id.to_string(),
            status: job.status.to_string(),
            repo: job.repo,
            owner: job.owner,
            repo_name: job.repo_name,
            created_at: job.created_at,
            updated_at: job.updated_at,
            result: job.result.and_then(|r| serde_json::to_value(r).ok()),
        }
    }
}

#[utoipa::path(
    get,
    path = "/job/{job_id}",
    tag = "Scans",
    params(("job_id" = String, Path, description = "Job identifier returned by POST /scan")),
    responses(
        (status = 200, description = "Job snapshot", body = JobView),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
pub async fn job_get(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobView>, (StatusCode, Json<ErrorResponse>)> {
    let id = JobId::from(job_id);
    state
        .jobs
        .get_job(&id)
        .map(|job| Json(JobView::from(job)))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Job not found".to_string(),
                    details: Some(format!("Job with ID {} does not exist", id)),
                }),
            )
        })
}

#[utoipa::path(
    get,
    path = "/jobs",
    tag = "Scans",
    responses((status = 200, description = "All jobs, oldest first", body = [JobView]))
)]
pub async fn jobs_list(State(state): State<Arc<AppState>>) -> Json<Vec<JobView>> {
    Json(state.jobs.list_jobs().into_iter().map(JobView::from).collect())
}
