//! `OpenAPI` specification generation for the tracking API.
//!
//! Served at `/openapi.json`; the dashboard build uses it to generate its
//! TypeScript client.

use axum::Json;
use axum::response::IntoResponse;
use utoipa::OpenApi;

/// `OpenAPI` documentation for the tracking API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AutoDeployX Tracking API",
        version = "0.1.0",
        description = "Backend service for tracking CI/CD metrics"
    ),
    paths(
        crate::routes::ingest::record_status,
        crate::routes::ingest::record_event,
        crate::routes::pipeline::get_current_pipeline,
        crate::routes::pipeline::update_stage,
        crate::routes::pipeline::trigger_pipeline,
        crate::routes::summary::get_deployments,
        crate::routes::summary::get_pipelines,
        crate::routes::summary::get_docker_images,
        crate::routes::summary::get_success_rate,
        crate::routes::summary::get_history_stats,
        crate::routes::summary::get_all_metrics,
        crate::routes::logs::get_recent_logs,
        crate::routes::builds::get_recent_builds,
        crate::routes::builds::get_build_history,
        crate::routes::kubernetes::get_kubernetes_status,
        crate::routes::kubernetes::update_pods,
        crate::routes::kubernetes::rollback_deployment,
        crate::routes::jenkins::get_jenkins_job,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::routes::ingest::StatusEventRequest,
            crate::routes::ingest::StatusEventResponse,
            crate::routes::ingest::LifecycleEventRequest,
            crate::routes::ingest::LifecycleEventResponse,
            crate::routes::pipeline::StageEventRequest,
            crate::routes::pipeline::StageEventResponse,
            crate::routes::pipeline::TriggerRequest,
            crate::routes::pipeline::TriggerResponse,
            crate::routes::summary::DeploymentTotalsResponse,
            crate::routes::summary::PipelineTotalsResponse,
            crate::routes::summary::ImageSummaryResponse,
            crate::routes::summary::AllMetricsResponse,
            crate::routes::logs::RecentLogsResponse,
            crate::routes::builds::RecentBuildsResponse,
            crate::routes::builds::BuildHistoryResponse,
            crate::routes::kubernetes::KubernetesStatusResponse,
            crate::routes::kubernetes::ReplacePodsResponse,
            crate::routes::kubernetes::RollbackRequest,
            crate::routes::kubernetes::RollbackResponse,
        )
    ),
    tags(
        (name = "ingest", description = "Event ingestion webhooks"),
        (name = "pipeline", description = "Current pipeline run"),
        (name = "metrics", description = "Dashboard summaries"),
        (name = "logs", description = "Deployment logs"),
        (name = "builds", description = "Build history"),
        (name = "kubernetes", description = "Cluster snapshot and rollouts"),
        (name = "jenkins", description = "Build server passthrough"),
    ),
)]
pub struct ApiDoc;

/// Returns the generated `OpenAPI` spec.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Handler for the `/openapi.json` endpoint.
pub async fn serve_openapi() -> impl IntoResponse {
    Json(openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_includes_the_ingestion_paths() {
        let spec = openapi();
        assert!(spec.paths.paths.contains_key("/jenkins/status"));
        assert!(spec.paths.paths.contains_key("/pipeline/trigger"));
        assert!(spec.paths.paths.contains_key("/metrics/all"));
        assert!(spec.paths.paths.contains_key("/jenkins/job/{job_name}"));
    }
}
