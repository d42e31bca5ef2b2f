//! Cluster snapshot and rollout routes.
//!
//! ## Routes
//!
//! - `GET  /kubernetes/status` - Cluster snapshot with rollout history
//! - `PUT  /kubernetes/pods` - Replace the pod list wholesale
//! - `POST /deployments/rollback` - Record a rollback

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use autodeployx_core::model::RolloutRecord;
use autodeployx_core::tracker::ROLLOUT_HISTORY_CAPACITY;

use crate::server::AppState;

/// Cluster snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct KubernetesStatusResponse {
    /// Cluster name.
    pub cluster: String,
    /// Namespace.
    pub namespace: String,
    /// Version label of the most recent successful deploy.
    pub current_version: String,
    /// Opaque pod descriptors as last reported.
    #[schema(value_type = Vec<Object>)]
    pub pods: Vec<serde_json::Value>,
    /// Rollout history, most recent first.
    #[schema(value_type = Vec<Object>)]
    pub rollout_history: Vec<RolloutRecord>,
}

/// Response to a pod-list replacement.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReplacePodsResponse {
    /// Always `replaced`.
    pub status: String,
    /// New pod count.
    pub count: usize,
}

/// Request to roll a deployment back.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RollbackRequest {
    /// Opaque deployment identifier. Not validated against any known
    /// deployment; rollbacks are accepted unconditionally.
    pub deployment_id: String,
}

/// Response to a rollback request.
#[derive(Debug, Serialize, ToSchema)]
pub struct RollbackResponse {
    /// Always `rolling`.
    pub status: String,
    /// The rollout record that was appended.
    #[schema(value_type = Object)]
    pub rollout: RolloutRecord,
}

/// Creates cluster routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/kubernetes/status", get(get_kubernetes_status))
        .route("/kubernetes/pods", put(update_pods))
        .route("/deployments/rollback", post(rollback_deployment))
}

/// Get the cluster snapshot.
///
/// GET /kubernetes/status
#[utoipa::path(
    get,
    path = "/kubernetes/status",
    tag = "kubernetes",
    responses(
        (status = 200, description = "Cluster snapshot", body = KubernetesStatusResponse),
    )
)]
pub(crate) async fn get_kubernetes_status(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let tracker = state.tracker();
    let k8s = tracker.kubernetes();
    let response = KubernetesStatusResponse {
        cluster: k8s.cluster.clone(),
        namespace: k8s.namespace.clone(),
        current_version: k8s.current_version.clone(),
        pods: k8s.pods.clone(),
        rollout_history: k8s.rollout_history.recent(ROLLOUT_HISTORY_CAPACITY),
    };
    drop(tracker);
    Json(response)
}

/// Replace the pod list.
///
/// PUT /kubernetes/pods
///
/// The body is a bare JSON array of opaque pod descriptor maps; the previous
/// list is discarded wholesale.
#[utoipa::path(
    put,
    path = "/kubernetes/pods",
    tag = "kubernetes",
    request_body = Vec<Object>,
    responses(
        (status = 200, description = "Pod list replaced", body = ReplacePodsResponse),
    )
)]
pub(crate) async fn update_pods(
    State(state): State<Arc<AppState>>,
    Json(pods): Json<Vec<serde_json::Value>>,
) -> impl IntoResponse {
    let count = state.tracker().replace_pods(pods);
    tracing::debug!(count, "Replaced pod list");
    Json(ReplacePodsResponse {
        status: "replaced".to_string(),
        count,
    })
}

/// Record a rollback.
///
/// POST /deployments/rollback
#[utoipa::path(
    post,
    path = "/deployments/rollback",
    tag = "kubernetes",
    request_body = RollbackRequest,
    responses(
        (status = 200, description = "Rollback recorded", body = RollbackResponse),
    )
)]
pub(crate) async fn rollback_deployment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RollbackRequest>,
) -> impl IntoResponse {
    tracing::warn!(deployment_id = %req.deployment_id, "Rollback requested");
    crate::metrics::record_event_ingested("rollback");

    let rollout = state.tracker().record_rollback(&req.deployment_id);
    Json(RollbackResponse {
        status: "rolling".to_string(),
        rollout,
    })
}
