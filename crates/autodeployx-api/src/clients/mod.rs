//! Outbound collaborator clients.
//!
//! Both collaborators (the Jenkins build server and the container registry)
//! are failure-tolerant passthroughs: calls carry a short timeout, no retry
//! policy, and every failure is recovered at the call site with a fallback
//! response. Nothing here is invoked while the tracker lock is held.

pub mod jenkins;
pub mod registry;

pub use jenkins::{BuildServer, JenkinsClient, JenkinsJob};
pub use registry::{DockerHubClient, ImageRegistry, ImageTag, TagListing};

/// Errors from outbound collaborator calls.
///
/// Callers never propagate these to the requester; they are logged and
/// replaced with fallback data. The one exception is the job-detail lookup,
/// where a not-found (or unreachable collaborator) surfaces as an API 404.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Transport(String),

    /// The collaborator answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Returns true when the collaborator definitively reported absence.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(404))
    }

    pub(crate) fn transport(error: &reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }

    pub(crate) fn decode(error: &reqwest::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
