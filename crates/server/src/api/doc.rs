//! OpenAPI document, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "issuescan API",
        version = "0.1.0",
        description = "Scans a GitHub repository's open issues into a PostgreSQL cache as background jobs.",
    ),
    tags(
        (name = "Health", description = "Welcome text and liveness"),
        (name = "Scans", description = "Start repository scans and track their jobs"),
    ),
    paths(
        crate::api::health::root,
        crate::api::health::health,
        crate::api::scan::scan,
        crate::api::jobs::job_get,
        crate::api::jobs::jobs_list,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::HealthResponse,
        crate::api::ScanBody,
        crate::api::ScanAccepted,
        crate::api::JobView,
    ))
)]
pub struct ApiDoc;
