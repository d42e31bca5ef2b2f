//! # autodeployx-api
//!
//! HTTP composition layer for the AutoDeployX tracking service.
//!
//! This crate provides the API surface for the tracker, handling:
//!
//! - **Routing**: HTTP endpoint configuration for the automation system and
//!   the dashboard
//! - **Collaborators**: failure-tolerant Jenkins and container-registry
//!   clients
//! - **Observability**: Prometheus metrics, request tracing, health checks
//!
//! ## Design Principles
//!
//! This crate is a **thin composition layer**. All state-transition logic
//! lives in `autodeployx-core`; handlers validate, take the tracker lock for
//! one mutation, and shape responses. No handler holds the lock across an
//! await point, so outbound calls can never block ingestion.
//!
//! ## Endpoints
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /ready                  - Readiness check
//! GET  /metrics                - Prometheus metrics
//! GET  /openapi.json           - OpenAPI document
//! POST /jenkins/status         - Pipeline status webhook
//! POST /deployments/event      - Lifecycle event webhook
//! POST /deployments/rollback   - Rollback bookkeeping
//! GET  /pipeline/current       - Current run snapshot
//! POST /pipeline/stage         - Stage transition
//! POST /pipeline/trigger       - Start a fresh run
//! GET  /metrics/*              - Dashboard summaries
//! GET  /logs/recent            - Recent deployment logs
//! GET  /pipelines/recent       - Recent builds
//! GET  /pipelines/history      - Build history with stats
//! GET  /kubernetes/status      - Cluster snapshot
//! PUT  /kubernetes/pods        - Pod list replacement
//! GET  /jenkins/job/{name}     - Build server job passthrough
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod clients;
pub mod config;
pub mod error;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::server::Server;
}
