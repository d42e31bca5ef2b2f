//! HTTP route handlers.

pub mod builds;
pub mod ingest;
pub mod jenkins;
pub mod kubernetes;
pub mod logs;
pub mod pipeline;
pub mod summary;

use std::sync::Arc;

use axum::Router;

use crate::server::AppState;

/// All tracking API routes.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(ingest::routes())
        .merge(pipeline::routes())
        .merge(summary::routes())
        .merge(logs::routes())
        .merge(builds::routes())
        .merge(kubernetes::routes())
        .merge(jenkins::routes())
}
