//! In-memory branch host for synchronisation tests.

use super::journal::{CallJournal, ExternalCall, FailureScript, lock_error};
use crate::work_item::{
    domain::{BranchName, RepositoryFullName},
    ports::{BranchClient, MergeOutcome, TrackerError, TrackerResult},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

/// Branch host operations that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchOperation {
    /// `create_ref`.
    CreateRef,
    /// `delete_ref`.
    DeleteRef,
    /// `compare`.
    Compare,
    /// `create_merge`.
    CreateMerge,
}

/// Thread-safe in-memory branch host.
///
/// Each branch tracks how many commits it is ahead of its base. New
/// branches start level with their base.
#[derive(Debug, Clone)]
pub struct InMemoryBranchHost {
    state: Arc<RwLock<InMemoryBranchState>>,
    journal: CallJournal,
}

#[derive(Debug, Default)]
struct InMemoryBranchState {
    branches: BTreeMap<String, u32>,
    conflicting: HashSet<String>,
    merged: Vec<String>,
    script: FailureScript<BranchOperation>,
}

impl InMemoryBranchHost {
    /// Creates a host containing only `base`.
    #[must_use]
    pub fn new(base: &BranchName, journal: CallJournal) -> Self {
        let mut state = InMemoryBranchState::default();
        state.branches.insert(base.as_str().to_owned(), 0);
        Self {
            state: Arc::new(RwLock::new(state)),
            journal,
        }
    }

    /// Creates or replaces a branch that is `ahead` commits past its base.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn seed_branch(&self, name: &str, ahead: u32) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.branches.insert(name.to_owned(), ahead);
        Ok(())
    }

    /// Adds commits to an existing branch.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] when the branch does not exist.
    pub fn push_commits(&self, name: &str, count: u32) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let ahead = state
            .branches
            .get_mut(name)
            .ok_or_else(|| missing_branch(name))?;
        *ahead = ahead.saturating_add(count);
        Ok(())
    }

    /// Makes merges of `name` report a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn mark_conflicting(&self, name: &str) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.conflicting.insert(name.to_owned());
        Ok(())
    }

    /// Removes a branch without journaling, e.g. to drop the base.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn remove_branch(&self, name: &str) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.branches.remove(name);
        Ok(())
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn fail_next(&self, operation: BranchOperation, error: TrackerError) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.script.push(operation, Some(error));
        Ok(())
    }

    /// Returns whether `name` exists.
    #[must_use]
    pub fn has_branch(&self, name: &str) -> bool {
        self.state
            .read()
            .is_ok_and(|state| state.branches.contains_key(name))
    }

    /// Returns the heads merged so far, oldest first.
    #[must_use]
    pub fn merged_heads(&self) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.merged.clone())
            .unwrap_or_default()
    }

    fn guard(&self, operation: BranchOperation, call: ExternalCall) -> TrackerResult<()> {
        self.journal.record(call)?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.script.next(&operation).map_or(Ok(()), Err)
    }
}

fn missing_branch(name: &str) -> TrackerError {
    TrackerError::NotFound(format!("branch '{name}'"))
}

#[async_trait]
impl BranchClient for InMemoryBranchHost {
    async fn create_ref(
        &self,
        _repository: &RepositoryFullName,
        name: &BranchName,
        base: &BranchName,
    ) -> TrackerResult<()> {
        self.guard(
            BranchOperation::CreateRef,
            ExternalCall::CreateRef {
                name: name.as_str().to_owned(),
            },
        )?;
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.branches.contains_key(base.as_str()) {
            return Err(missing_branch(base.as_str()));
        }
        if state.branches.contains_key(name.as_str()) {
            return Err(TrackerError::AlreadyExists(format!("branch '{name}'")));
        }
        state.branches.insert(name.as_str().to_owned(), 0);
        Ok(())
    }

    async fn delete_ref(
        &self,
        _repository: &RepositoryFullName,
        name: &BranchName,
    ) -> TrackerResult<()> {
        self.guard(
            BranchOperation::DeleteRef,
            ExternalCall::DeleteRef {
                name: name.as_str().to_owned(),
            },
        )?;
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .branches
            .remove(name.as_str())
            .map(|_| ())
            .ok_or_else(|| missing_branch(name.as_str()))
    }

    async fn compare(
        &self,
        _repository: &RepositoryFullName,
        base: &BranchName,
        head: &BranchName,
    ) -> TrackerResult<u32> {
        self.guard(
            BranchOperation::Compare,
            ExternalCall::Compare {
                head: head.as_str().to_owned(),
            },
        )?;
        let state = self.state.read().map_err(lock_error)?;
        if !state.branches.contains_key(base.as_str()) {
            return Err(missing_branch(base.as_str()));
        }
        state
            .branches
            .get(head.as_str())
            .copied()
            .ok_or_else(|| missing_branch(head.as_str()))
    }

    async fn create_merge(
        &self,
        _repository: &RepositoryFullName,
        base: &BranchName,
        head: &BranchName,
    ) -> TrackerResult<MergeOutcome> {
        self.guard(
            BranchOperation::CreateMerge,
            ExternalCall::CreateMerge {
                head: head.as_str().to_owned(),
            },
        )?;
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.branches.contains_key(base.as_str()) {
            return Ok(MergeOutcome::NotFound);
        }
        let Some(ahead) = state.branches.get(head.as_str()).copied() else {
            return Ok(MergeOutcome::NotFound);
        };
        if state.conflicting.contains(head.as_str()) {
            return Ok(MergeOutcome::Conflict);
        }
        if ahead == 0 {
            return Ok(MergeOutcome::NoCommits);
        }
        state.branches.insert(head.as_str().to_owned(), 0);
        state.merged.push(head.as_str().to_owned());
        Ok(MergeOutcome::Merged)
    }
}
