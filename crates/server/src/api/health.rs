//! Welcome text and liveness.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use issuescan_scan::JobStatus;

use crate::state::AppState;

pub const WELCOME: &str = "Welcome to the GitHub Issue Scanner!";

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Welcome text", body = String))
)]
pub async fn root() -> &'static str {
    WELCOME
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Jobs known to this process, any status.
    pub jobs_total: usize,
    /// Jobs still `pending` or `in-progress`.
    pub jobs_active: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let jobs = state.jobs.list_jobs();
    let jobs_active = jobs
        .iter()
        .filter(|j| matches!(j.status, JobStatus::Pending | JobStatus::InProgress))
        .count();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        jobs_total: jobs.len(),
        jobs_active,
    })
}
