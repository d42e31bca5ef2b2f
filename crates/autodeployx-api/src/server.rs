//! API server implementation.
//!
//! Provides health, ready, and tracking endpoints for the AutoDeployX
//! dashboard.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, middleware};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use autodeployx_core::tracker::Tracker;
use autodeployx_core::{Error, Result, model};

use crate::clients::{BuildServer, DockerHubClient, ImageRegistry, JenkinsClient};
use crate::config::{Config, CorsConfig};

/// Service name reported by the health endpoint.
const SERVICE_NAME: &str = "AutoDeployX Tracking API";

// ============================================================================
// Health and Ready Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Current timestamp.
    pub timestamp: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all request handlers.
///
/// The tracker is the single mutable state block; every mutation happens
/// under its mutex, and no handler holds the guard across an await point.
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    tracker: Mutex<Tracker>,
    build_server: Arc<dyn BuildServer>,
    registry: Arc<dyn ImageRegistry>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("build_server", &"<BuildServer>")
            .field("registry", &"<ImageRegistry>")
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates new application state with the production collaborator
    /// clients.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let build_server: Arc<dyn BuildServer> =
            Arc::new(JenkinsClient::new(config.jenkins.clone()));
        let registry: Arc<dyn ImageRegistry> = Arc::new(DockerHubClient::new(&config.registry));
        Self::with_collaborators(config, build_server, registry)
    }

    /// Creates new application state with explicit collaborators (tests).
    #[must_use]
    pub fn with_collaborators(
        config: Config,
        build_server: Arc<dyn BuildServer>,
        registry: Arc<dyn ImageRegistry>,
    ) -> Self {
        let tracker = Tracker::new(
            config.kubernetes.cluster.clone(),
            config.kubernetes.namespace.clone(),
        );
        Self {
            config,
            tracker: Mutex::new(tracker),
            build_server,
            registry,
        }
    }

    /// Locks and returns the tracker.
    ///
    /// A poisoned lock is recovered rather than propagated: the tracker's
    /// mutations never panic part-way, so the inner state is still coherent.
    pub fn tracker(&self) -> MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the build-server client.
    #[must_use]
    pub fn build_server(&self) -> Arc<dyn BuildServer> {
        Arc::clone(&self.build_server)
    }

    /// Returns the image-registry client.
    #[must_use]
    pub fn registry(&self) -> Arc<dyn ImageRegistry> {
        Arc::clone(&self.registry)
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint handler.
///
/// Returns 200 OK if the service is alive. This is a shallow check; the
/// service has no hard dependencies.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: model::full_timestamp(),
    })
}

/// Readiness check endpoint handler.
///
/// The tracker is in-memory and always available; collaborators are
/// failure-tolerant, so they do not gate readiness.
async fn ready() -> impl IntoResponse {
    Json(ReadyResponse { ready: true })
}

// ============================================================================
// Server
// ============================================================================

/// The tracking API server.
pub struct Server {
    config: Config,
    build_server: Arc<dyn BuildServer>,
    registry: Arc<dyn ImageRegistry>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("build_server", &"<BuildServer>")
            .field("registry", &"<ImageRegistry>")
            .finish()
    }
}

impl Server {
    /// Creates a new server with the given configuration and the production
    /// collaborator clients.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let build_server: Arc<dyn BuildServer> =
            Arc::new(JenkinsClient::new(config.jenkins.clone()));
        let registry: Arc<dyn ImageRegistry> = Arc::new(DockerHubClient::new(&config.registry));
        Self {
            config,
            build_server,
            registry,
        }
    }

    /// Creates a new server with explicit collaborators.
    #[must_use]
    pub fn with_collaborators(
        config: Config,
        build_server: Arc<dyn BuildServer>,
        registry: Arc<dyn ImageRegistry>,
    ) -> Self {
        Self {
            config,
            build_server,
            registry,
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the router with all routes and middleware.
    fn create_router(&self) -> Router {
        let state = Arc::new(AppState::with_collaborators(
            self.config.clone(),
            Arc::clone(&self.build_server),
            Arc::clone(&self.registry),
        ));

        let cors = self.build_cors_layer();
        let metrics_layer = middleware::from_fn(crate::metrics::metrics_middleware);

        Router::new()
            // Health, ready, metrics, and spec endpoints
            .route("/health", get(health))
            .route("/ready", get(ready))
            .route("/metrics", get(crate::metrics::serve_metrics))
            .route("/openapi.json", get(crate::openapi::serve_openapi))
            // Tracking API routes
            .merge(crate::routes::api_routes())
            // Middleware (order matters): metrics outermost for timing, then
            // trace, then CORS.
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(metrics_layer)
            // Shared state
            .with_state(state)
    }

    /// Builds the CORS layer from configuration.
    fn build_cors_layer(&self) -> CorsLayer {
        let cors_config = &self.config.cors;
        let cors = Self::build_cors_base(cors_config);
        Self::apply_cors_allowed_origins(cors, cors_config)
    }

    fn build_cors_base(cors_config: &CorsConfig) -> CorsLayer {
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PUT,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .max_age(Duration::from_secs(cors_config.max_age_seconds))
    }

    fn cors_allows_any_origin(cors_config: &CorsConfig) -> bool {
        cors_config.allowed_origins.len() == 1
            && cors_config
                .allowed_origins
                .first()
                .is_some_and(|origin| origin == "*")
    }

    fn parse_cors_origins(cors_config: &CorsConfig) -> Vec<HeaderValue> {
        let mut allowed = Vec::new();
        for origin in &cors_config.allowed_origins {
            match HeaderValue::from_str(origin) {
                Ok(value) => allowed.push(value),
                Err(_) => {
                    tracing::error!(
                        origin = %origin,
                        "Invalid CORS origin; expected a valid HeaderValue"
                    );
                }
            }
        }
        allowed
    }

    fn apply_cors_allowed_origins(cors: CorsLayer, cors_config: &CorsConfig) -> CorsLayer {
        if cors_config.allowed_origins.is_empty() {
            return cors;
        }

        if Self::cors_allows_any_origin(cors_config) {
            return cors.allow_origin(Any);
        }

        let allowed = Self::parse_cors_origins(cors_config);

        if allowed.is_empty() {
            tracing::warn!("All configured CORS origins were invalid; disabling CORS");
            cors
        } else {
            tracing::info!(origins = ?cors_config.allowed_origins, "CORS configured");
            cors.allow_origin(AllowOrigin::list(allowed))
        }
    }

    /// Starts the server and blocks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot start or bind to the port.
    pub async fn serve(&self) -> Result<()> {
        // Initialize metrics before starting the server
        crate::metrics::init_metrics();

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let router = self.create_router();

        tracing::info!(
            http_port = self.config.http_port,
            "Starting AutoDeployX tracking API server"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal {
                message: format!("failed to bind to {addr}: {e}"),
            })?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal {
                message: format!("server error: {e}"),
            })?;

        Ok(())
    }

    /// Creates a test router for the server.
    ///
    /// This is useful for integration tests where you want to exercise the
    /// routes without actually binding to a port.
    #[doc(hidden)]
    pub fn test_router(&self) -> Router {
        self.create_router()
    }
}
