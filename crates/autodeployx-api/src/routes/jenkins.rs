//! Jenkins job passthrough routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::error::ApiError;
use crate::server::AppState;

/// Creates Jenkins passthrough routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/jenkins/job/:job_name", get(get_jenkins_job))
}

/// Get details for a specific Jenkins job.
///
/// `GET /jenkins/job/{job_name}`
///
/// This is the one caller-visible failure in the API: when the build server
/// confirms the job is absent or cannot be reached at all, the lookup fails
/// as not-found.
#[utoipa::path(
    get,
    path = "/jenkins/job/{job_name}",
    tag = "jenkins",
    params(
        ("job_name" = String, Path, description = "Jenkins job name")
    ),
    responses(
        (status = 200, description = "Job detail document", body = Object),
        (status = 404, description = "Job not found or build server unavailable",
            body = crate::error::ApiErrorBody),
    )
)]
pub(crate) async fn get_jenkins_job(
    State(state): State<Arc<AppState>>,
    Path(job_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.build_server().job_detail(&job_name).await {
        Ok(detail) => Ok(Json(detail)),
        Err(error) => {
            tracing::warn!(job = %job_name, error = %error, "Jenkins job detail unavailable");
            Err(ApiError::job_not_found(&job_name))
        }
    }
}
