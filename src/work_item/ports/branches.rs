//! Branch host port.

use super::TrackerResult;
use crate::work_item::domain::{BranchName, RepositoryFullName};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified result of a merge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// The head was merged into the base.
    Merged,
    /// The head has no commits the base lacks.
    NoCommits,
    /// The merge produced conflicts.
    Conflict,
    /// The base or head does not exist.
    NotFound,
}

impl MergeOutcome {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::NoCommits => "no_commits",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Client for branch operations on the version-control host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BranchClient: Send + Sync {
    /// Creates `name` pointing at the tip of `base`.
    ///
    /// Returns [`super::TrackerError::AlreadyExists`] when the branch exists
    /// and [`super::TrackerError::NotFound`] when `base` does not.
    async fn create_ref(
        &self,
        repository: &RepositoryFullName,
        name: &BranchName,
        base: &BranchName,
    ) -> TrackerResult<()>;

    /// Deletes the branch `name`.
    async fn delete_ref(
        &self,
        repository: &RepositoryFullName,
        name: &BranchName,
    ) -> TrackerResult<()>;

    /// Returns how many commits `head` has that `base` lacks.
    async fn compare(
        &self,
        repository: &RepositoryFullName,
        base: &BranchName,
        head: &BranchName,
    ) -> TrackerResult<u32>;

    /// Merges `head` into `base`.
    async fn create_merge(
        &self,
        repository: &RepositoryFullName,
        base: &BranchName,
        head: &BranchName,
    ) -> TrackerResult<MergeOutcome>;
}
