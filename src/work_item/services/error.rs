//! Service-level error taxonomy for synchronisation workflows.

use crate::work_item::{domain::WorkItemDomainError, ports::TrackerError};
use thiserror::Error;

/// Result type for synchronisation service operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of a synchronisation workflow.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// The request violates a domain rule; nothing external was attempted.
    #[error(transparent)]
    Validation(#[from] WorkItemDomainError),

    /// A branch, base, parent, or issue does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The tracker or branch host refused the call.
    #[error("permission denied: {0}")]
    Permission(String),

    /// A merge or update conflicts with remote state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limiting or a server-side failure; safe to retry later.
    #[error("transient tracker failure: {0}")]
    Transient(String),

    /// Any other tracker failure.
    #[error(transparent)]
    External(TrackerError),

    /// A forward action failed and the compensating call failed too.
    ///
    /// External state is left inconsistent with the local tree.
    #[error("{cause}; compensation also failed: {compensation}")]
    CompensationFailed {
        /// Failure of the forward action.
        cause: Box<SyncError>,
        /// Failure of the compensating call.
        compensation: TrackerError,
    },

    /// Unexpected internal failure such as a poisoned lock.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Returns whether the error leaves external state unrepaired.
    #[must_use]
    pub const fn is_irrecoverable(&self) -> bool {
        matches!(self, Self::CompensationFailed { .. })
    }

    pub(crate) fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TrackerError> for SyncError {
    fn from(value: TrackerError) -> Self {
        match value {
            TrackerError::NotFound(detail) => Self::NotFound(detail),
            TrackerError::Permission(detail) => Self::Permission(detail),
            TrackerError::Conflict(detail) => Self::Conflict(detail),
            TrackerError::Transient(detail) => Self::Transient(detail),
            other @ (TrackerError::AlreadyExists(_) | TrackerError::Other(_)) => {
                Self::External(other)
            }
        }
    }
}
