//! Dashboard metrics routes.
//!
//! ## Routes
//!
//! - `GET /metrics/deployments` - Deployment totals
//! - `GET /metrics/pipelines` - Pipeline totals + Jenkins job listing
//! - `GET /metrics/docker-images` - Registry image summary
//! - `GET /metrics/success-rate` - Deployment success rate
//! - `GET /metrics/history-stats` - Build history statistics
//! - `GET /metrics/all` - The four summaries in one call
//!
//! The pipeline and image summaries delegate to the external build server
//! and registry; on any failure the response falls back to tracked/default
//! data and the failure is logged operationally, never surfaced.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use autodeployx_core::summary::{HistoryStats, SuccessRate};

use crate::clients::{ImageTag, JenkinsJob};
use crate::server::AppState;

/// Registry source label reported in image summaries.
const REGISTRY_SOURCE: &str = "DockerHub";

/// Number of tags included in an image summary.
const IMAGE_TAG_LIMIT: usize = 10;

/// Deployment totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentTotalsResponse {
    /// Number of status events ever received.
    pub total: u64,
    /// Same window as `total` (the ledger is in-memory only).
    pub this_month: u64,
    /// Number of successful runs.
    pub success: u64,
    /// Number of failed runs.
    pub failed: u64,
}

/// Pipeline totals with the build server's job listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct PipelineTotalsResponse {
    /// Job count from the build server, or the tracked event total on
    /// fallback.
    pub total: u64,
    /// Number of currently-active runs (always tracked locally).
    pub active: u64,
    /// Job name/color pairs; empty on fallback.
    #[schema(value_type = Vec<Object>)]
    pub jobs: Vec<JenkinsJob>,
}

/// Registry image summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageSummaryResponse {
    /// Total tag count reported by the registry; zero on fallback.
    pub count: u64,
    /// Registry source label.
    pub source: String,
    /// The configured repository, preserved even on fallback.
    pub repository: String,
    /// First tag names.
    pub tags: Vec<String>,
    /// Tag details (update timestamps, byte sizes).
    #[schema(value_type = Vec<Object>)]
    pub details: Vec<ImageTag>,
}

/// All dashboard summaries in one response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AllMetricsResponse {
    /// Deployment totals.
    pub deployments: DeploymentTotalsResponse,
    /// Pipeline totals.
    pub pipelines: PipelineTotalsResponse,
    /// Image summary.
    pub docker_images: ImageSummaryResponse,
    /// Success rate.
    #[schema(value_type = Object)]
    pub success_rate: SuccessRate,
    /// Current timestamp.
    pub timestamp: String,
}

/// Creates dashboard metrics routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/metrics/deployments", get(get_deployments))
        .route("/metrics/pipelines", get(get_pipelines))
        .route("/metrics/docker-images", get(get_docker_images))
        .route("/metrics/success-rate", get(get_success_rate))
        .route("/metrics/history-stats", get(get_history_stats))
        .route("/metrics/all", get(get_all_metrics))
}

fn deployment_totals(state: &AppState) -> DeploymentTotalsResponse {
    let counters = state.tracker().counters();
    DeploymentTotalsResponse {
        total: counters.total,
        this_month: counters.total,
        success: counters.succeeded,
        failed: counters.failed,
    }
}

/// Queries the build server's job listing, falling back to tracked counters.
async fn fetch_pipeline_totals(state: &AppState) -> PipelineTotalsResponse {
    match state.build_server().list_jobs().await {
        Ok(jobs) => PipelineTotalsResponse {
            total: jobs.len() as u64,
            active: state.tracker().counters().active,
            jobs,
        },
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Build server job listing failed; falling back to tracked counters"
            );
            crate::metrics::record_collaborator_fallback("jenkins");
            let counters = state.tracker().counters();
            PipelineTotalsResponse {
                total: counters.total,
                active: counters.active,
                jobs: Vec::new(),
            }
        }
    }
}

/// Queries the registry's tag listing, falling back to an empty summary
/// that preserves the configured repository.
async fn fetch_image_summary(state: &AppState) -> ImageSummaryResponse {
    let repository = state.config.registry.repository_path();
    match state.registry().list_tags().await {
        Ok(listing) => ImageSummaryResponse {
            count: listing.count,
            source: REGISTRY_SOURCE.to_string(),
            repository,
            tags: listing
                .tags
                .iter()
                .take(IMAGE_TAG_LIMIT)
                .map(|t| t.name.clone())
                .collect(),
            details: listing.tags.into_iter().take(IMAGE_TAG_LIMIT).collect(),
        },
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Registry tag listing failed; falling back to empty summary"
            );
            crate::metrics::record_collaborator_fallback("registry");
            ImageSummaryResponse {
                count: 0,
                source: REGISTRY_SOURCE.to_string(),
                repository,
                tags: Vec::new(),
                details: Vec::new(),
            }
        }
    }
}

/// Get deployment totals.
///
/// GET /metrics/deployments
#[utoipa::path(
    get,
    path = "/metrics/deployments",
    tag = "metrics",
    responses(
        (status = 200, description = "Deployment totals", body = DeploymentTotalsResponse),
    )
)]
pub(crate) async fn get_deployments(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(deployment_totals(&state))
}

/// Get pipeline totals and the build server's job listing.
///
/// GET /metrics/pipelines
#[utoipa::path(
    get,
    path = "/metrics/pipelines",
    tag = "metrics",
    responses(
        (status = 200, description = "Pipeline totals", body = PipelineTotalsResponse),
    )
)]
pub(crate) async fn get_pipelines(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(fetch_pipeline_totals(&state).await)
}

/// Get the registry image summary.
///
/// GET /metrics/docker-images
#[utoipa::path(
    get,
    path = "/metrics/docker-images",
    tag = "metrics",
    responses(
        (status = 200, description = "Image summary", body = ImageSummaryResponse),
    )
)]
pub(crate) async fn get_docker_images(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(fetch_image_summary(&state).await)
}

/// Get the deployment success rate.
///
/// GET /metrics/success-rate
#[utoipa::path(
    get,
    path = "/metrics/success-rate",
    tag = "metrics",
    responses(
        (status = 200, description = "Success rate", body = Object),
    )
)]
pub(crate) async fn get_success_rate(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rate: SuccessRate = state.tracker().success_rate();
    Json(rate)
}

/// Get build history statistics.
///
/// GET /metrics/history-stats
#[utoipa::path(
    get,
    path = "/metrics/history-stats",
    tag = "metrics",
    responses(
        (status = 200, description = "History statistics", body = Object),
    )
)]
pub(crate) async fn get_history_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats: HistoryStats = state.tracker().history_stats();
    Json(stats)
}

/// Get all dashboard summaries in one call.
///
/// GET /metrics/all
#[utoipa::path(
    get,
    path = "/metrics/all",
    tag = "metrics",
    responses(
        (status = 200, description = "All summaries", body = AllMetricsResponse),
    )
)]
pub(crate) async fn get_all_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // The sub-results have no dependency on one another; the two
    // collaborator-backed ones run concurrently.
    let (pipelines, docker_images) =
        tokio::join!(fetch_pipeline_totals(&state), fetch_image_summary(&state));

    Json(AllMetricsResponse {
        deployments: deployment_totals(&state),
        pipelines,
        docker_images,
        success_rate: state.tracker().success_rate(),
        timestamp: autodeployx_core::model::full_timestamp(),
    })
}
