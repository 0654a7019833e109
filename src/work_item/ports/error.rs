//! Error taxonomy shared by the tracker-facing ports.

use std::sync::Arc;
use thiserror::Error;

/// Result type for tracker and branch-host operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors returned by issue tracker and branch host adapters.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    /// The referenced issue, branch, or base ref does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The credentials lack the permission required for the call.
    #[error("permission denied: {0}")]
    Permission(String),

    /// The call conflicts with current remote state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The resource being created already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Rate limiting or a server-side failure. Retrying is the caller's call.
    #[error("transient tracker failure: {0}")]
    Transient(String),

    /// Any other adapter failure.
    #[error("tracker error: {0}")]
    Other(Arc<dyn std::error::Error + Send + Sync>),
}

impl TrackerError {
    /// Wraps an adapter error that fits no other category.
    #[must_use]
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Arc::new(err))
    }
}
