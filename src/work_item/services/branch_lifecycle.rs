//! Branch side effects of leaf state transitions.

use super::SyncError;
use crate::config::SyncConfig;
use crate::work_item::{
    domain::{
        BranchHandle, BranchLifecycleState, BranchName, IssueNumber, RepositoryFullName,
        WorkItemState,
    },
    ports::{BranchClient, MergeOutcome, TrackerError},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Branch work performed for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchAction {
    /// No branch call was needed.
    Untouched,
    /// A fresh branch was created from the integration branch.
    Created,
    /// The branch already existed and was adopted as-is.
    AdoptedExisting,
    /// The branch was merged into the integration branch and deleted.
    MergedAndDeleted,
    /// The branch was merged but could not be deleted afterwards.
    MergedOnly,
    /// The branch carried no commits and was deleted without a merge.
    DeletedEmpty,
}

/// Branch-side result of a successful or tolerably failed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStep {
    branch: BranchHandle,
    action: BranchAction,
    state: BranchLifecycleState,
}

impl BranchStep {
    const fn new(branch: BranchHandle, action: BranchAction, state: BranchLifecycleState) -> Self {
        Self {
            branch,
            action,
            state,
        }
    }

    /// Returns the branch the step concerned.
    #[must_use]
    pub const fn branch(&self) -> &BranchHandle {
        &self.branch
    }

    /// Returns what was done.
    #[must_use]
    pub const fn action(&self) -> BranchAction {
        self.action
    }

    /// Returns the branch lifecycle state after the step.
    #[must_use]
    pub const fn state(&self) -> BranchLifecycleState {
        self.state
    }
}

/// Discriminated result of driving the branch lifecycle.
#[derive(Debug, Clone)]
#[must_use]
pub enum BranchTransition {
    /// Branch work finished.
    Succeeded(BranchStep),
    /// The transition stands but a cleanup call failed.
    FailedNonFatal {
        /// Step as far as it got.
        step: BranchStep,
        /// The cleanup failure to surface as a warning.
        error: TrackerError,
    },
    /// Branch work failed; the issue update must be compensated.
    NeedsCompensation {
        /// Failure to report once compensation has run.
        error: SyncError,
    },
}

/// Drives branch creation, merge, and deletion for leaf transitions.
pub struct BranchLifecycleOrchestrator<B>
where
    B: BranchClient,
{
    branches: Arc<B>,
    integration_branch: BranchName,
    branch_prefix: String,
}

impl<B> BranchLifecycleOrchestrator<B>
where
    B: BranchClient,
{
    /// Creates an orchestrator using the branch settings from `config`.
    #[must_use]
    pub fn new(branches: Arc<B>, config: &SyncConfig) -> Self {
        Self {
            branches,
            integration_branch: config.integration_branch.clone(),
            branch_prefix: config.branch_prefix.clone(),
        }
    }

    /// Returns the branch tracking `number` in `repository`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] when the configured prefix yields an
    /// invalid branch name.
    pub fn handle_for(
        &self,
        repository: &RepositoryFullName,
        number: IssueNumber,
    ) -> Result<BranchHandle, SyncError> {
        Ok(BranchHandle::for_item(
            repository.clone(),
            number,
            &self.branch_prefix,
        )?)
    }

    /// Performs the branch work for a leaf moving from `from` to `to`.
    ///
    /// Entering `InProgress` creates the branch. `InProgress` to `Done`
    /// merges and deletes it. Every other pair leaves branches alone.
    pub async fn transition(
        &self,
        repository: &RepositoryFullName,
        number: IssueNumber,
        from: WorkItemState,
        to: WorkItemState,
    ) -> BranchTransition {
        let branch = match self.handle_for(repository, number) {
            Ok(branch) => branch,
            Err(error) => return BranchTransition::NeedsCompensation { error },
        };
        match (from, to) {
            (WorkItemState::Todo | WorkItemState::Done, WorkItemState::InProgress) => {
                self.open(branch).await
            }
            (WorkItemState::InProgress, WorkItemState::Done) => self.resolve(branch).await,
            (WorkItemState::InProgress, _) => BranchTransition::Succeeded(BranchStep::new(
                branch,
                BranchAction::Untouched,
                BranchLifecycleState::BranchActive,
            )),
            _ => BranchTransition::Succeeded(BranchStep::new(
                branch,
                BranchAction::Untouched,
                BranchLifecycleState::NoBranch,
            )),
        }
    }

    async fn open(&self, branch: BranchHandle) -> BranchTransition {
        debug!(branch = %branch, "creating branch");
        match self
            .branches
            .create_ref(branch.repository(), branch.name(), &self.integration_branch)
            .await
        {
            Ok(()) => BranchTransition::Succeeded(BranchStep::new(
                branch,
                BranchAction::Created,
                BranchLifecycleState::BranchActive,
            )),
            Err(TrackerError::AlreadyExists(_)) => {
                debug!(branch = %branch, "branch already exists; adopting it");
                BranchTransition::Succeeded(BranchStep::new(
                    branch,
                    BranchAction::AdoptedExisting,
                    BranchLifecycleState::BranchActive,
                ))
            }
            Err(error) => BranchTransition::NeedsCompensation {
                error: error.into(),
            },
        }
    }

    async fn resolve(&self, branch: BranchHandle) -> BranchTransition {
        let ahead = match self
            .branches
            .compare(branch.repository(), &self.integration_branch, branch.name())
            .await
        {
            Ok(ahead) => ahead,
            Err(error) => {
                return BranchTransition::NeedsCompensation {
                    error: error.into(),
                };
            }
        };
        if ahead == 0 {
            return self.delete_empty(branch).await;
        }

        debug!(branch = %branch, ahead, "merging branch");
        let outcome = self
            .branches
            .create_merge(branch.repository(), &self.integration_branch, branch.name())
            .await;
        match outcome {
            Ok(MergeOutcome::Merged) => self.delete_merged(branch).await,
            Ok(MergeOutcome::NoCommits) => self.delete_empty(branch).await,
            Ok(MergeOutcome::Conflict) => BranchTransition::NeedsCompensation {
                error: SyncError::Conflict(format!(
                    "merging {branch} into {} conflicts",
                    self.integration_branch
                )),
            },
            Ok(MergeOutcome::NotFound) => BranchTransition::NeedsCompensation {
                error: SyncError::NotFound(format!(
                    "{branch} or its base {}",
                    self.integration_branch
                )),
            },
            Err(error) => BranchTransition::NeedsCompensation {
                error: error.into(),
            },
        }
    }

    async fn delete_merged(&self, branch: BranchHandle) -> BranchTransition {
        match self
            .branches
            .delete_ref(branch.repository(), branch.name())
            .await
        {
            Ok(()) => BranchTransition::Succeeded(BranchStep::new(
                branch,
                BranchAction::MergedAndDeleted,
                BranchLifecycleState::Resolved,
            )),
            Err(error) => {
                warn!(branch = %branch, error = %error, "merged branch could not be deleted");
                BranchTransition::FailedNonFatal {
                    step: BranchStep::new(
                        branch,
                        BranchAction::MergedOnly,
                        BranchLifecycleState::Resolved,
                    ),
                    error,
                }
            }
        }
    }

    async fn delete_empty(&self, branch: BranchHandle) -> BranchTransition {
        debug!(branch = %branch, "branch has no commits; deleting without merge");
        match self
            .branches
            .delete_ref(branch.repository(), branch.name())
            .await
        {
            Ok(()) => BranchTransition::Succeeded(BranchStep::new(
                branch,
                BranchAction::DeletedEmpty,
                BranchLifecycleState::Resolved,
            )),
            Err(error) => BranchTransition::NeedsCompensation {
                error: error.into(),
            },
        }
    }
}
