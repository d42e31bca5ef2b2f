//! Deployment log routes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use autodeployx_core::model::LogLine;

use crate::server::AppState;

/// Default number of log lines returned.
const DEFAULT_LOG_LIMIT: usize = 20;

/// Query parameters for recent logs.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecentLogsQuery {
    /// Maximum number of lines to return (default 20).
    pub limit: Option<usize>,
}

/// Recent deployment logs.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentLogsResponse {
    /// Most recent lines first.
    #[schema(value_type = Vec<Object>)]
    pub logs: Vec<LogLine>,
    /// Number of retained lines.
    pub total: usize,
}

/// Creates log routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/logs/recent", get(get_recent_logs))
}

/// Get recent deployment logs.
///
/// GET /logs/recent
#[utoipa::path(
    get,
    path = "/logs/recent",
    tag = "logs",
    params(RecentLogsQuery),
    responses(
        (status = 200, description = "Recent logs", body = RecentLogsResponse),
    )
)]
pub(crate) async fn get_recent_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentLogsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let tracker = state.tracker();
    let response = RecentLogsResponse {
        logs: tracker.recent_logs(limit),
        total: tracker.log_count(),
    };
    drop(tracker);
    Json(response)
}
