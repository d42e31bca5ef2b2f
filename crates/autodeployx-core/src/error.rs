//! Error types and result aliases for the tracking core.

/// The result type used throughout the tracking service.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tracking-service operations.
///
/// The ingestion core itself is total over its inputs (saturating counters,
/// unconditional appends); these variants exist for the composition layer:
/// configuration parsing, startup, and collaborator plumbing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested resource was not found.
    #[error("not found: {resource_type} with id {id}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// An upstream collaborator (build server, registry) failed.
    #[error("collaborator error: {message}")]
    Collaborator {
        /// Description of the collaborator failure.
        message: String,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new collaborator error with the given message.
    #[must_use]
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }

    /// Creates a new resource not found error.
    #[must_use]
    pub fn resource_not_found(resource_type: &'static str, id: impl std::fmt::Display) -> Self {
        Self::ResourceNotFound {
            resource_type,
            id: id.to_string(),
        }
    }
}
