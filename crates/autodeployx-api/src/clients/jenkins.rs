//! HTTP client for the Jenkins build server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::ClientError;
use crate::config::JenkinsConfig;

/// Timeout for read-side queries (job listing, job detail).
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for build trigger calls.
const TRIGGER_TIMEOUT: Duration = Duration::from_secs(10);

/// One Jenkins job as reported by the controller's job listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JenkinsJob {
    /// Job name.
    pub name: String,
    /// Jenkins status color (e.g. `blue`, `red`, `blue_anime`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The core's expectations of the build server.
///
/// The production implementation is [`JenkinsClient`]; tests substitute
/// stubs. Every method maps one call site with its own timeout; callers own
/// the fallback policy.
#[async_trait]
pub trait BuildServer: Send + Sync {
    /// Lists the controller's jobs with their status colors.
    async fn list_jobs(&self) -> Result<Vec<JenkinsJob>, ClientError>;

    /// Triggers a build of the named job. Any 2xx means the build was
    /// accepted.
    async fn trigger_job(&self, job_name: &str) -> Result<(), ClientError>;

    /// Fetches the controller's detail document for the named job.
    async fn job_detail(&self, job_name: &str) -> Result<Value, ClientError>;
}

/// Jenkins REST client.
#[derive(Clone)]
pub struct JenkinsClient {
    config: JenkinsConfig,
    client: reqwest::Client,
}

impl JenkinsClient {
    /// Creates a new client for the configured controller.
    #[must_use]
    pub fn new(config: JenkinsConfig) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authenticated(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_token.as_deref() {
            Some(token) => builder.basic_auth(&self.config.user, Some(token)),
            None => builder,
        }
    }
}

#[async_trait]
impl BuildServer for JenkinsClient {
    async fn list_jobs(&self) -> Result<Vec<JenkinsJob>, ClientError> {
        let response = self
            .authenticated(self.client.get(self.url("/api/json")))
            .timeout(QUERY_TIMEOUT)
            .send()
            .await
            .map_err(|e| ClientError::transport(&e))?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        let overview = response
            .json::<JobOverview>()
            .await
            .map_err(|e| ClientError::decode(&e))?;
        Ok(overview.jobs)
    }

    async fn trigger_job(&self, job_name: &str) -> Result<(), ClientError> {
        let response = self
            .authenticated(self.client.post(self.url(&format!("/job/{job_name}/build"))))
            .timeout(TRIGGER_TIMEOUT)
            .send()
            .await
            .map_err(|e| ClientError::transport(&e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Status(response.status().as_u16()))
        }
    }

    async fn job_detail(&self, job_name: &str) -> Result<Value, ClientError> {
        let response = self
            .authenticated(
                self.client
                    .get(self.url(&format!("/job/{job_name}/api/json"))),
            )
            .timeout(QUERY_TIMEOUT)
            .send()
            .await
            .map_err(|e| ClientError::transport(&e))?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::decode(&e))
    }
}

/// Shape of the controller's `/api/json` overview.
#[derive(Debug, Deserialize)]
struct JobOverview {
    #[serde(default)]
    jobs: Vec<JenkinsJob>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use serde_json::json;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: String) -> JenkinsClient {
        JenkinsClient::new(JenkinsConfig {
            base_url,
            user: "admin".to_string(),
            api_token: None,
        })
    }

    #[tokio::test]
    async fn list_jobs_parses_names_and_colors() {
        let app = Router::new().route(
            "/api/json",
            get(|| async {
                axum::Json(json!({
                    "jobs": [
                        {"name": "backend", "color": "blue"},
                        {"name": "frontend", "color": "red"},
                    ]
                }))
            }),
        );
        let client = client_for(spawn_server(app).await);

        let jobs = client.list_jobs().await.expect("jobs");
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "backend");
        assert_eq!(jobs[1].color.as_deref(), Some("red"));
    }

    #[tokio::test]
    async fn list_jobs_maps_server_errors_to_status() {
        let app = Router::new().route(
            "/api/json",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let client = client_for(spawn_server(app).await);

        let result = client.list_jobs().await;
        assert!(matches!(result, Err(ClientError::Status(500))));
    }

    #[tokio::test]
    async fn trigger_accepts_any_success_status() {
        let app = Router::new().route(
            "/job/backend/build",
            post(|| async { StatusCode::CREATED }),
        );
        let client = client_for(spawn_server(app).await);

        assert!(client.trigger_job("backend").await.is_ok());
    }

    #[tokio::test]
    async fn trigger_reports_rejections() {
        let app = Router::new().route(
            "/job/backend/build",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let client = client_for(spawn_server(app).await);

        let result = client.trigger_job("backend").await;
        assert!(matches!(result, Err(ClientError::Status(503))));
    }

    #[tokio::test]
    async fn job_detail_not_found_is_distinguishable() {
        let app = Router::new();
        let client = client_for(spawn_server(app).await);

        let result = client.job_detail("missing").await;
        match result {
            Err(error) => assert!(error.is_not_found()),
            Ok(_) => panic!("expected a not-found error"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Nothing listens on this port.
        let client = client_for("http://127.0.0.1:9".to_string());

        let result = client.list_jobs().await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
