//! Call journal and failure scripting shared by the in-memory adapters.

use crate::work_item::{
    domain::{IssueNumber, IssuePatch},
    ports::TrackerError,
};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, RwLock};

/// External call observed by an in-memory adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalCall {
    /// `list_issues`.
    ListIssues,
    /// `create_issue` with the draft title.
    CreateIssue {
        /// Draft title.
        title: String,
    },
    /// `update_issue`.
    UpdateIssue {
        /// Target issue.
        number: IssueNumber,
        /// Patch applied.
        patch: IssuePatch,
    },
    /// `link_sub_issue`.
    LinkSubIssue {
        /// Parent issue.
        parent: IssueNumber,
        /// Child issue.
        child: IssueNumber,
    },
    /// `delete_issue`.
    DeleteIssue {
        /// Deleted issue.
        number: IssueNumber,
    },
    /// `create_ref`.
    CreateRef {
        /// Branch name.
        name: String,
    },
    /// `delete_ref`.
    DeleteRef {
        /// Branch name.
        name: String,
    },
    /// `compare`.
    Compare {
        /// Head branch name.
        head: String,
    },
    /// `create_merge`.
    CreateMerge {
        /// Head branch name.
        head: String,
    },
}

/// Ordered record of external calls, shareable between adapters so tests
/// can assert ordering across the issue tracker and the branch host.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    calls: Arc<RwLock<Vec<ExternalCall>>>,
}

impl CallJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Other`] when lock acquisition fails.
    pub fn record(&self, call: ExternalCall) -> Result<(), TrackerError> {
        let mut calls = self
            .calls
            .write()
            .map_err(|err| TrackerError::other(std::io::Error::other(err.to_string())))?;
        calls.push(call);
        Ok(())
    }

    /// Returns every call recorded so far, oldest first.
    ///
    /// A poisoned lock yields an empty list.
    #[must_use]
    pub fn calls(&self) -> Vec<ExternalCall> {
        self.calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

/// Per-operation queue of scripted outcomes.
///
/// `None` entries let a call through; `Some` entries fail it. Operations
/// with an empty queue succeed.
#[derive(Debug)]
pub(super) struct FailureScript<Op> {
    queues: HashMap<Op, VecDeque<Option<TrackerError>>>,
}

impl<Op> Default for FailureScript<Op> {
    fn default() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }
}

impl<Op: Eq + Hash> FailureScript<Op> {
    pub(super) fn push(&mut self, operation: Op, outcome: Option<TrackerError>) {
        self.queues.entry(operation).or_default().push_back(outcome);
    }

    pub(super) fn next(&mut self, operation: &Op) -> Option<TrackerError> {
        self.queues
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .flatten()
    }
}

/// Maps lock poisoning into the port error type.
pub(super) fn lock_error(err: impl std::fmt::Display) -> TrackerError {
    TrackerError::other(std::io::Error::other(err.to_string()))
}
