//! Build history routes.
//!
//! ## Routes
//!
//! - `GET /pipelines/recent` - Most recent builds (default 10)
//! - `GET /pipelines/history` - Deeper history with statistics (default 50)

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use autodeployx_core::model::BuildRecord;
use autodeployx_core::summary::HistoryStats;

use crate::server::AppState;

const DEFAULT_RECENT_LIMIT: usize = 10;
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Query parameters for build listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BuildsQuery {
    /// Maximum number of builds to return.
    pub limit: Option<usize>,
}

/// Recent builds.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentBuildsResponse {
    /// Most recent builds first.
    #[schema(value_type = Vec<Object>)]
    pub builds: Vec<BuildRecord>,
    /// Number of retained build records.
    pub total: usize,
}

/// Build history with statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuildHistoryResponse {
    /// Most recent builds first.
    #[schema(value_type = Vec<Object>)]
    pub builds: Vec<BuildRecord>,
    /// Number of retained build records.
    pub total: usize,
    /// Aggregated statistics over the full history.
    #[schema(value_type = Object)]
    pub stats: HistoryStats,
}

/// Creates build history routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pipelines/recent", get(get_recent_builds))
        .route("/pipelines/history", get(get_build_history))
}

/// Get recent pipeline builds.
///
/// GET /pipelines/recent
#[utoipa::path(
    get,
    path = "/pipelines/recent",
    tag = "builds",
    params(BuildsQuery),
    responses(
        (status = 200, description = "Recent builds", body = RecentBuildsResponse),
    )
)]
pub(crate) async fn get_recent_builds(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BuildsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let tracker = state.tracker();
    let response = RecentBuildsResponse {
        builds: tracker.recent_builds(limit),
        total: tracker.build_count(),
    };
    drop(tracker);
    Json(response)
}

/// Get paginated build history with statistics.
///
/// GET /pipelines/history
#[utoipa::path(
    get,
    path = "/pipelines/history",
    tag = "builds",
    params(BuildsQuery),
    responses(
        (status = 200, description = "Build history", body = BuildHistoryResponse),
    )
)]
pub(crate) async fn get_build_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BuildsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let tracker = state.tracker();
    let response = BuildHistoryResponse {
        builds: tracker.recent_builds(limit),
        total: tracker.build_count(),
        stats: tracker.history_stats(),
    };
    drop(tracker);
    Json(response)
}
