//! Event ingestion routes.
//!
//! These are the webhook endpoints the automation system pushes into:
//!
//! - `POST /jenkins/status` - Pipeline status updates (from the Jenkinsfile)
//! - `POST /deployments/event` - Generic deployment lifecycle events
//!
//! Delivery is at-least-once and non-deduplicated: a duplicate event is
//! applied as a new distinct mutation.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use autodeployx_core::model::{BuildRecord, BuildStatus, LogLine};
use autodeployx_core::tracker::{LifecycleEvent, StatusEvent};

use crate::server::AppState;

/// Pipeline status update pushed by the automation system.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusEventRequest {
    /// Target run status.
    pub status: BuildStatus,
    /// Pipeline name.
    #[serde(default)]
    pub pipeline_name: Option<String>,
    /// Producer-assigned build number.
    #[serde(default)]
    pub build_number: Option<u64>,
    /// Stage label the run is currently in.
    #[serde(default)]
    pub stage: Option<String>,
    /// Free-text message.
    #[serde(default)]
    pub message: Option<String>,
    /// Branch the build ran against.
    #[serde(default)]
    pub branch: Option<String>,
}

/// Response to a status update: echoes the appended build record.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusEventResponse {
    /// Always `received`.
    pub status: String,
    /// The build record that was appended.
    #[schema(value_type = Object)]
    pub build: BuildRecord,
}

/// Generic deployment lifecycle event.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LifecycleEventRequest {
    /// Producer-defined event type (e.g. `build_start`, `deploy`).
    pub event_type: String,
    /// Producer-reported status label.
    pub status: String,
    /// Opaque details. A `deploy` event with status `success` and a
    /// `version` detail advances the rollout history.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Response to a lifecycle event: echoes the derived log line.
#[derive(Debug, Serialize, ToSchema)]
pub struct LifecycleEventResponse {
    /// Always `recorded`.
    pub status: String,
    /// The log line that was appended.
    #[schema(value_type = Object)]
    pub log: LogLine,
}

/// Creates ingestion routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jenkins/status", post(record_status))
        .route("/deployments/event", post(record_event))
}

/// Receive a pipeline status update.
///
/// POST /jenkins/status
#[utoipa::path(
    post,
    path = "/jenkins/status",
    tag = "ingest",
    request_body = StatusEventRequest,
    responses(
        (status = 200, description = "Status recorded", body = StatusEventResponse),
        (status = 422, description = "Malformed event"),
    )
)]
pub(crate) async fn record_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StatusEventRequest>,
) -> impl IntoResponse {
    tracing::info!(
        status = %req.status,
        pipeline = req.pipeline_name.as_deref().unwrap_or("-"),
        build_number = ?req.build_number,
        "Received pipeline status update"
    );
    crate::metrics::record_event_ingested("status");

    let build = state.tracker().record_status(StatusEvent {
        status: req.status,
        pipeline_name: req.pipeline_name,
        build_number: req.build_number,
        stage: req.stage,
        message: req.message,
        branch: req.branch,
    });

    Json(StatusEventResponse {
        status: "received".to_string(),
        build,
    })
}

/// Record a deployment lifecycle event.
///
/// POST /deployments/event
#[utoipa::path(
    post,
    path = "/deployments/event",
    tag = "ingest",
    request_body = LifecycleEventRequest,
    responses(
        (status = 200, description = "Event recorded", body = LifecycleEventResponse),
        (status = 422, description = "Malformed event"),
    )
)]
pub(crate) async fn record_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LifecycleEventRequest>,
) -> impl IntoResponse {
    tracing::info!(
        event_type = %req.event_type,
        status = %req.status,
        "Received deployment lifecycle event"
    );
    crate::metrics::record_event_ingested("lifecycle");

    let event = LifecycleEvent::new(req.event_type, req.status, req.details);
    let log = state.tracker().record_lifecycle(&event);

    Json(LifecycleEventResponse {
        status: "recorded".to_string(),
        log,
    })
}
