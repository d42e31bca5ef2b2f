//! HTTP client for the container registry (Docker Hub v2 API).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::ClientError;
use crate::config::RegistryConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One image tag as reported by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTag {
    /// Tag name.
    pub name: String,
    /// Last-updated timestamp, when the registry reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Image size in bytes, when the registry reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_size: Option<u64>,
}

/// Tag listing for the configured repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagListing {
    /// Total tag count reported by the registry.
    pub count: u64,
    /// The first page of tags.
    pub tags: Vec<ImageTag>,
}

/// The core's expectations of the image registry.
#[async_trait]
pub trait ImageRegistry: Send + Sync {
    /// Lists the repository's tags.
    async fn list_tags(&self) -> Result<TagListing, ClientError>;
}

/// Docker Hub REST client.
#[derive(Clone)]
pub struct DockerHubClient {
    base_url: String,
    repository_path: String,
    client: reqwest::Client,
}

impl DockerHubClient {
    /// Creates a new client for the configured repository.
    #[must_use]
    pub fn new(config: &RegistryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            repository_path: config.repository_path(),
            client,
        }
    }

    fn tags_url(&self) -> String {
        format!(
            "{}/v2/repositories/{}/tags/",
            self.base_url, self.repository_path
        )
    }
}

#[async_trait]
impl ImageRegistry for DockerHubClient {
    async fn list_tags(&self) -> Result<TagListing, ClientError> {
        let response = self
            .client
            .get(self.tags_url())
            .send()
            .await
            .map_err(|e| ClientError::transport(&e))?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        let page = response
            .json::<TagsPage>()
            .await
            .map_err(|e| ClientError::decode(&e))?;

        Ok(TagListing {
            count: page.count,
            tags: page.results,
        })
    }
}

/// Shape of Docker Hub's paginated tags response.
#[derive(Debug, Deserialize)]
struct TagsPage {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    results: Vec<ImageTag>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
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

    fn client_for(base_url: String) -> DockerHubClient {
        DockerHubClient::new(&RegistryConfig {
            base_url,
            user: "sarika".to_string(),
            repository: "autodeployx".to_string(),
        })
    }

    #[tokio::test]
    async fn list_tags_parses_count_and_results() {
        let app = Router::new().route(
            "/v2/repositories/sarika/autodeployx/tags/",
            get(|| async {
                axum::Json(json!({
                    "count": 12,
                    "results": [
                        {"name": "latest", "last_updated": "2025-11-01T08:00:00Z", "full_size": 104_857_600},
                        {"name": "v1.4.2"},
                    ]
                }))
            }),
        );
        let client = client_for(spawn_server(app).await);

        let listing = client.list_tags().await.expect("tags");
        assert_eq!(listing.count, 12);
        assert_eq!(listing.tags.len(), 2);
        assert_eq!(listing.tags[0].name, "latest");
        assert_eq!(listing.tags[1].full_size, None);
    }

    #[tokio::test]
    async fn list_tags_maps_server_errors_to_status() {
        let app = Router::new().route(
            "/v2/repositories/sarika/autodeployx/tags/",
            get(|| async { StatusCode::TOO_MANY_REQUESTS }),
        );
        let client = client_for(spawn_server(app).await);

        let result = client.list_tags().await;
        assert!(matches!(result, Err(ClientError::Status(429))));
    }
}
