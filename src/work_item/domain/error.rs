//! Error types for work-item domain validation and parsing.

use super::WorkItemId;
use thiserror::Error;

/// Errors returned while constructing or editing domain work-item values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkItemDomainError {
    /// The repository name does not follow `owner/repo` format.
    #[error("invalid repository name '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// The issue number is invalid.
    #[error("invalid issue number {0}, expected a positive integer")]
    InvalidIssueNumber(u64),

    /// The branch name is empty, contains a colon, or is too long.
    #[error("invalid branch name: '{0}'")]
    InvalidBranchName(String),

    /// The work-item title is empty after trimming.
    #[error("work item title must not be empty")]
    EmptyTitle,

    /// A manual state was requested for an item that has children.
    #[error("work item {item_id} has {child_count} children; its state is derived")]
    ManualStateOnInternalItem {
        /// Item whose state was targeted.
        item_id: WorkItemId,
        /// Number of direct children the item has.
        child_count: usize,
    },

    /// The item only exists locally and has no external record yet.
    #[error("work item {0} has not been confirmed by the tracker yet")]
    UnconfirmedItem(WorkItemId),

    /// The request names a different repository than the loaded project.
    #[error("repository '{requested}' does not match the loaded project '{loaded}'")]
    RepositoryMismatch {
        /// Repository named by the request.
        requested: String,
        /// Repository of the current project snapshot.
        loaded: String,
    },
}

/// Error returned while parsing work-item states from external text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown work item state: {0}")]
pub struct ParseWorkItemStateError(pub String);
