//! Server configuration.
//!
//! Configuration is loaded from `ADX_*` environment variables, the canonical
//! runtime path for container deployments. Every value has a default that
//! matches the development docker-compose topology.

use serde::{Deserialize, Serialize};

use autodeployx_core::{Error, Result};

/// Configuration for the tracking API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port.
    pub http_port: u16,

    /// Enable debug mode (pretty logs instead of JSON).
    pub debug: bool,

    /// CORS configuration for the dashboard.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Jenkins build-server connection.
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    /// Container registry connection.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Static Kubernetes identity reported in snapshots.
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8000,
            debug: false,
            cors: CorsConfig::default(),
            jenkins: JenkinsConfig::default(),
            registry: RegistryConfig::default(),
            kubernetes: KubernetesConfig::default(),
        }
    }
}

/// CORS configuration for browser-based dashboard access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. `["*"]` allows all origins; an empty list disables
    /// CORS entirely.
    pub allowed_origins: Vec<String>,

    /// Max age for preflight cache (seconds).
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            // The dashboard is served from an arbitrary origin in the
            // development topology.
            allowed_origins: vec!["*".to_string()],
            max_age_seconds: 3600,
        }
    }
}

/// Jenkins build-server connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct JenkinsConfig {
    /// Base URL of the Jenkins controller.
    pub base_url: String,
    /// User for API authentication.
    pub user: String,
    /// API token; requests go unauthenticated when unset.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://jenkins:8080".to_string(),
            user: "admin".to_string(),
            api_token: None,
        }
    }
}

impl std::fmt::Debug for JenkinsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Container registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry API base URL.
    pub base_url: String,
    /// Registry account.
    pub user: String,
    /// Repository name within the account.
    pub repository: String,
}

impl RegistryConfig {
    /// The fully-qualified `user/repository` path.
    #[must_use]
    pub fn repository_path(&self) -> String {
        format!("{}/{}", self.user, self.repository)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hub.docker.com".to_string(),
            user: "sarika".to_string(),
            repository: "autodeployx".to_string(),
        }
    }
}

/// Static Kubernetes identity reported in cluster snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesConfig {
    /// Cluster name.
    pub cluster: String,
    /// Namespace the service deploys into.
    pub namespace: String,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            cluster: "autodeployx-cluster".to_string(),
            namespace: "default".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Supported env vars:
    /// - `ADX_HTTP_PORT`
    /// - `ADX_DEBUG`
    /// - `ADX_CORS_ALLOWED_ORIGINS` (comma-separated, or `*`)
    /// - `ADX_CORS_MAX_AGE_SECONDS`
    /// - `ADX_JENKINS_URL`
    /// - `ADX_JENKINS_USER`
    /// - `ADX_JENKINS_TOKEN`
    /// - `ADX_REGISTRY_URL`
    /// - `ADX_REGISTRY_USER`
    /// - `ADX_REGISTRY_REPO`
    /// - `ADX_K8S_CLUSTER`
    /// - `ADX_K8S_NAMESPACE`
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable is present but cannot be
    /// parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("ADX_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(debug) = env_bool("ADX_DEBUG")? {
            config.debug = debug;
        }

        if let Some(origins) = env_string("ADX_CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = parse_cors_allowed_origins(&origins);
        }
        if let Some(max_age) = env_u64("ADX_CORS_MAX_AGE_SECONDS")? {
            config.cors.max_age_seconds = max_age;
        }

        if let Some(url) = env_string("ADX_JENKINS_URL") {
            config.jenkins.base_url = url;
        }
        if let Some(user) = env_string("ADX_JENKINS_USER") {
            config.jenkins.user = user;
        }
        if let Some(token) = env_string("ADX_JENKINS_TOKEN") {
            config.jenkins.api_token = Some(token);
        }

        if let Some(url) = env_string("ADX_REGISTRY_URL") {
            config.registry.base_url = url;
        }
        if let Some(user) = env_string("ADX_REGISTRY_USER") {
            config.registry.user = user;
        }
        if let Some(repo) = env_string("ADX_REGISTRY_REPO") {
            config.registry.repository = repo;
        }

        if let Some(cluster) = env_string("ADX_K8S_CLUSTER") {
            config.kubernetes.cluster = cluster;
        }
        if let Some(namespace) = env_string("ADX_K8S_NAMESPACE") {
            config.kubernetes.namespace = namespace;
        }

        Ok(config)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u16: {e}")))
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u64>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u64: {e}")))
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    parse_bool(name, &v).map(Some)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

fn parse_cors_allowed_origins(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed == "*" {
        return vec!["*".to_string()];
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
