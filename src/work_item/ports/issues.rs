//! Issue tracker port.

use super::TrackerResult;
use crate::work_item::domain::{
    IssueDraft, IssueNumber, IssuePatch, IssueRecord, RepositoryFullName,
};
use async_trait::async_trait;

/// Client for the external issue tracker.
///
/// The list endpoint is only eventually consistent: an issue deleted a
/// moment ago may still be returned, with or without its tombstone label.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueClient: Send + Sync {
    /// Lists every issue of the repository, including logically deleted ones.
    async fn list_issues(
        &self,
        repository: &RepositoryFullName,
    ) -> TrackerResult<Vec<IssueRecord>>;

    /// Creates an issue and returns the number the tracker assigned.
    async fn create_issue(
        &self,
        repository: &RepositoryFullName,
        draft: &IssueDraft,
    ) -> TrackerResult<IssueNumber>;

    /// Applies a partial update to an issue.
    async fn update_issue(
        &self,
        repository: &RepositoryFullName,
        number: IssueNumber,
        patch: &IssuePatch,
    ) -> TrackerResult<()>;

    /// Links `child` as a sub-issue of `parent`.
    async fn link_sub_issue(
        &self,
        repository: &RepositoryFullName,
        parent: IssueNumber,
        child: IssueNumber,
    ) -> TrackerResult<()>;

    /// Logically deletes an issue: closes it and applies the tombstone label.
    async fn delete_issue(
        &self,
        repository: &RepositoryFullName,
        number: IssueNumber,
    ) -> TrackerResult<()>;
}
