//! Current-pipeline routes.
//!
//! ## Routes
//!
//! - `GET  /pipeline/current` - Snapshot of the current run
//! - `POST /pipeline/stage` - Stage transition within the current run
//! - `POST /pipeline/trigger` - Start a fresh run

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use autodeployx_core::model::{
    CurrentRun, DEFAULT_BRANCH, DEFAULT_PIPELINE_NAME, StageEntry, StageStatus,
};
use autodeployx_core::tracker::StageEvent;

use crate::server::AppState;

/// Stage transition pushed by the automation system.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StageEventRequest {
    /// Stage name (the identity key within the run).
    pub stage_name: String,
    /// New stage status.
    pub status: StageStatus,
    /// Explicit short timestamp; stamped with the wall clock when absent.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response to a stage transition: echoes the resulting stage entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct StageEventResponse {
    /// Always `updated`.
    pub status: String,
    /// The stage entry after the update.
    #[schema(value_type = Object)]
    pub stage: StageEntry,
}

/// Request to start a fresh run.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TriggerRequest {
    /// Pipeline to trigger.
    #[serde(default = "default_pipeline_name")]
    pub pipeline_name: String,
    /// Branch to build.
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_pipeline_name() -> String {
    DEFAULT_PIPELINE_NAME.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

/// Response to a trigger request.
///
/// `triggered` means the build server accepted the job; `queued` means the
/// notification failed and the run is tracked locally only. The local state
/// mutation is identical on both paths.
#[derive(Debug, Serialize, ToSchema)]
pub struct TriggerResponse {
    /// `triggered` or `queued`.
    pub status: String,
    /// Provisional build number assigned to the run.
    pub build_number: u64,
    /// Pipeline that was triggered.
    pub pipeline_name: String,
    /// Branch being built.
    pub branch: String,
}

/// Creates current-pipeline routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pipeline/current", get(get_current_pipeline))
        .route("/pipeline/stage", post(update_stage))
        .route("/pipeline/trigger", post(trigger_pipeline))
}

/// Get the current run snapshot.
///
/// GET /pipeline/current
#[utoipa::path(
    get,
    path = "/pipeline/current",
    tag = "pipeline",
    responses(
        (status = 200, description = "Current run snapshot", body = Object),
    )
)]
pub(crate) async fn get_current_pipeline(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let run: CurrentRun = state.tracker().current_run().clone();
    Json(run)
}

/// Apply a stage transition to the current run.
///
/// POST /pipeline/stage
#[utoipa::path(
    post,
    path = "/pipeline/stage",
    tag = "pipeline",
    request_body = StageEventRequest,
    responses(
        (status = 200, description = "Stage updated", body = StageEventResponse),
        (status = 422, description = "Malformed event"),
    )
)]
pub(crate) async fn update_stage(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StageEventRequest>,
) -> impl IntoResponse {
    tracing::info!(stage = %req.stage_name, status = %req.status, "Received stage update");
    crate::metrics::record_event_ingested("stage");

    let stage = state.tracker().record_stage(StageEvent {
        stage_name: req.stage_name,
        status: req.status,
        timestamp: req.timestamp,
    });

    Json(StageEventResponse {
        status: "updated".to_string(),
        stage,
    })
}

/// Trigger a fresh pipeline run.
///
/// POST /pipeline/trigger
///
/// The run is reset and an active slot claimed whether or not the build
/// server accepts the notification; the outcome only decides the response
/// wording and the appended log line.
#[utoipa::path(
    post,
    path = "/pipeline/trigger",
    tag = "pipeline",
    request_body = TriggerRequest,
    responses(
        (status = 200, description = "Run started", body = TriggerResponse),
    )
)]
pub(crate) async fn trigger_pipeline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TriggerRequest>,
) -> impl IntoResponse {
    tracing::info!(pipeline = %req.pipeline_name, branch = %req.branch, "Triggering pipeline");
    crate::metrics::record_event_ingested("trigger");

    // Reset first; the notification must never gate local state.
    let build_number = state.tracker().begin_run(&req.pipeline_name, &req.branch);

    let triggered = match state.build_server().trigger_job(&req.pipeline_name).await {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(
                pipeline = %req.pipeline_name,
                error = %error,
                "Build server trigger failed; reporting queued"
            );
            crate::metrics::record_collaborator_fallback("jenkins");
            false
        }
    };

    state
        .tracker()
        .record_trigger_outcome(&req.pipeline_name, build_number, triggered);

    let status = if triggered { "triggered" } else { "queued" };
    Json(TriggerResponse {
        status: status.to_string(),
        build_number,
        pipeline_name: req.pipeline_name,
        branch: req.branch,
    })
}
