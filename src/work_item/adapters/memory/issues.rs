//! In-memory issue tracker for synchronisation tests.

use super::journal::{CallJournal, ExternalCall, FailureScript, lock_error};
use crate::work_item::{
    domain::{IssueDraft, IssueNumber, IssuePatch, IssueRecord, IssueStatus, RepositoryFullName},
    ports::{IssueClient, TrackerError, TrackerResult},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Issue tracker operations that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueOperation {
    /// `list_issues`.
    List,
    /// `create_issue`.
    Create,
    /// `update_issue`.
    Update,
    /// `link_sub_issue`.
    Link,
    /// `delete_issue`.
    Delete,
}

/// Thread-safe in-memory issue tracker.
///
/// Deleting an issue closes it and applies the tombstone label but keeps it
/// listable, as real trackers do. [`Self::freeze_listing`] pins the list
/// endpoint to its current contents to emulate read-after-write lag.
#[derive(Debug, Clone)]
pub struct InMemoryIssueTracker {
    state: Arc<RwLock<InMemoryIssueState>>,
    journal: CallJournal,
    tombstone_label: String,
}

#[derive(Debug, Default)]
struct InMemoryIssueState {
    issues: BTreeMap<IssueNumber, IssueRecord>,
    next_number: u64,
    frozen_listing: Option<Vec<IssueRecord>>,
    script: FailureScript<IssueOperation>,
}

impl InMemoryIssueTracker {
    /// Creates an empty tracker using `tombstone_label` for deletions.
    #[must_use]
    pub fn new(tombstone_label: impl Into<String>, journal: CallJournal) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryIssueState::default())),
            journal,
            tombstone_label: tombstone_label.into(),
        }
    }

    /// Inserts an existing issue.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn seed(&self, record: IssueRecord) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.next_number = state.next_number.max(record.number.value());
        state.issues.insert(record.number, record);
        Ok(())
    }

    /// Returns the current record for `number`, if any.
    #[must_use]
    pub fn issue(&self, number: IssueNumber) -> Option<IssueRecord> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.issues.get(&number).cloned())
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn fail_next(&self, operation: IssueOperation, error: TrackerError) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.script.push(operation, Some(error));
        Ok(())
    }

    /// Lets the next call of `operation` through before any queued failure.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn succeed_next(&self, operation: IssueOperation) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.script.push(operation, None);
        Ok(())
    }

    /// Pins the list endpoint to the records as they are now.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn freeze_listing(&self) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.frozen_listing = Some(state.issues.values().cloned().collect());
        Ok(())
    }

    /// Makes the list endpoint reflect current records again.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn thaw_listing(&self) -> TrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.frozen_listing = None;
        Ok(())
    }

    /// Returns the journal this tracker records into.
    #[must_use]
    pub const fn journal(&self) -> &CallJournal {
        &self.journal
    }

    fn guard(&self, operation: IssueOperation, call: ExternalCall) -> TrackerResult<()> {
        self.journal.record(call)?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.script.next(&operation).map_or(Ok(()), Err)
    }
}

fn missing_issue(number: IssueNumber) -> TrackerError {
    TrackerError::NotFound(format!("issue #{number}"))
}

#[async_trait]
impl IssueClient for InMemoryIssueTracker {
    async fn list_issues(
        &self,
        _repository: &RepositoryFullName,
    ) -> TrackerResult<Vec<IssueRecord>> {
        self.guard(IssueOperation::List, ExternalCall::ListIssues)?;
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .frozen_listing
            .clone()
            .unwrap_or_else(|| state.issues.values().cloned().collect()))
    }

    async fn create_issue(
        &self,
        _repository: &RepositoryFullName,
        draft: &IssueDraft,
    ) -> TrackerResult<IssueNumber> {
        self.guard(
            IssueOperation::Create,
            ExternalCall::CreateIssue {
                title: draft.title.clone(),
            },
        )?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.next_number += 1;
        let number = IssueNumber::new(state.next_number).map_err(TrackerError::other)?;
        state.issues.insert(
            number,
            IssueRecord {
                number,
                title: draft.title.clone(),
                body: draft.body.clone(),
                status: IssueStatus::Open,
                labels: draft.labels.clone(),
                parent: None,
            },
        );
        Ok(number)
    }

    async fn update_issue(
        &self,
        _repository: &RepositoryFullName,
        number: IssueNumber,
        patch: &IssuePatch,
    ) -> TrackerResult<()> {
        self.guard(
            IssueOperation::Update,
            ExternalCall::UpdateIssue {
                number,
                patch: patch.clone(),
            },
        )?;
        let mut state = self.state.write().map_err(lock_error)?;
        let record = state
            .issues
            .get_mut(&number)
            .ok_or_else(|| missing_issue(number))?;
        if let Some(title) = &patch.title {
            record.title.clone_from(title);
        }
        if let Some(body) = &patch.body {
            record.body.clone_from(body);
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(labels) = &patch.labels {
            record.labels.clone_from(labels);
        }
        Ok(())
    }

    async fn link_sub_issue(
        &self,
        _repository: &RepositoryFullName,
        parent: IssueNumber,
        child: IssueNumber,
    ) -> TrackerResult<()> {
        self.guard(
            IssueOperation::Link,
            ExternalCall::LinkSubIssue { parent, child },
        )?;
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.issues.contains_key(&parent) {
            return Err(missing_issue(parent));
        }
        let record = state
            .issues
            .get_mut(&child)
            .ok_or_else(|| missing_issue(child))?;
        record.parent = Some(parent);
        Ok(())
    }

    async fn delete_issue(
        &self,
        _repository: &RepositoryFullName,
        number: IssueNumber,
    ) -> TrackerResult<()> {
        self.guard(IssueOperation::Delete, ExternalCall::DeleteIssue { number })?;
        let mut state = self.state.write().map_err(lock_error)?;
        let record = state
            .issues
            .get_mut(&number)
            .ok_or_else(|| missing_issue(number))?;
        record.status = IssueStatus::Closed;
        if !record.has_label(&self.tombstone_label) {
            record.labels.push(self.tombstone_label.clone());
        }
        Ok(())
    }
}
