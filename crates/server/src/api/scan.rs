//! `POST /scan`: validate the repository name and start a background scan.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use issuescan_core::RepoName;
use issuescan_scan::JobStatus;

use crate::state::AppState;

use super::ErrorResponse;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ScanBody {
    /// `owner/name`, e.g. `rust-lang/rust`.
    pub repo: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScanAccepted {
    pub job_id: String,
    pub status: String,
    pub repo: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/scan",
    tag = "Scans",
    request_body = ScanBody,
    responses(
        (status = 202, description = "Scan job created", body = ScanAccepted),
        (status = 400, description = "Invalid repository name", body = ErrorResponse)
    )
)]
pub async fn scan(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScanBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ScanAccepted>), (StatusCode, Json<ErrorResponse>)> {
    let repo = body
        .ok()
        .and_then(|Json(b)| b.repo)
        .unwrap_or_default();

    let name = RepoName::parse(&repo).map_err(|e| {
        warn!(repo = %repo, "rejected scan request: {:?}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
                details: None,
            }),
        )
    })?;

    let job_id = state.scans.trigger(&name);
    info!(job_id = %job_id, repo = %name, "scan job queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(ScanAccepted {
            message: format!(
                "Scan started for {}. Use GET /job/{} to track progress.",
                name, job_id
            ),
            job_id: job_id.to_string(),
            status: JobStatus::Pending.to_string(),
            repo: name.full_name(),
        }),
    ))
}
