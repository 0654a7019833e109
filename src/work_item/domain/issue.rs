//! Issue payloads exchanged with the external tracker.

use super::{IssueNumber, WorkItem, WorkItemState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open/closed status of an external issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// The issue is open.
    Open,
    /// The issue is closed.
    Closed,
}

impl IssueStatus {
    /// Maps an item state to the issue status that mirrors it.
    #[must_use]
    pub const fn for_state(state: WorkItemState) -> Self {
        match state {
            WorkItemState::Done => Self::Closed,
            WorkItemState::Todo | WorkItemState::InProgress => Self::Open,
        }
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Issue as returned by the tracker's list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Tracker-assigned issue number.
    pub number: IssueNumber,
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: String,
    /// Open/closed status.
    pub status: IssueStatus,
    /// Labels in tracker order.
    pub labels: Vec<String>,
    /// Parent issue when the record is linked as a sub-issue.
    pub parent: Option<IssueNumber>,
}

impl IssueRecord {
    /// Returns whether the record carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|candidate| candidate == label)
    }

    /// Derives the leaf state mirrored by this record.
    ///
    /// Closed issues are `Done`; open issues carrying `in_progress_label`
    /// are `InProgress`; every other open issue is `Todo`.
    #[must_use]
    pub fn leaf_state(&self, in_progress_label: &str) -> WorkItemState {
        match self.status {
            IssueStatus::Closed => WorkItemState::Done,
            IssueStatus::Open if self.has_label(in_progress_label) => WorkItemState::InProgress,
            IssueStatus::Open => WorkItemState::Todo,
        }
    }

    /// Returns the first label not listed in `reserved`.
    #[must_use]
    pub fn category<'a>(&'a self, reserved: &[&str]) -> Option<&'a str> {
        self.labels
            .iter()
            .map(String::as_str)
            .find(|label| !reserved.contains(label))
    }
}

/// Payload for creating an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: String,
    /// Labels to apply.
    pub labels: Vec<String>,
}

/// Partial update of an issue. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement body.
    pub body: Option<String>,
    /// Replacement status.
    pub status: Option<IssueStatus>,
    /// Replacement label set.
    pub labels: Option<Vec<String>>,
}

impl IssuePatch {
    /// Builds the full patch that makes an issue mirror `item`.
    ///
    /// `Done` closes the issue and every other state opens it. Labels are
    /// computed by [`labels_for`], so labels the item does not own survive.
    #[must_use]
    pub fn mirroring(item: &WorkItem, in_progress_label: &str) -> Self {
        Self {
            title: Some(item.title().to_owned()),
            body: Some(item.description().to_owned()),
            status: Some(IssueStatus::for_state(item.state())),
            labels: Some(labels_for(item, in_progress_label)),
        }
    }

    /// Builds the patch that puts an issue back to how `previous` saw it.
    ///
    /// The captured label list is written back verbatim. An item that was
    /// never mirrored falls back to [`labels_for`].
    #[must_use]
    pub fn restoring(previous: &WorkItem, in_progress_label: &str) -> Self {
        let labels = if previous.labels().is_empty() {
            labels_for(previous, in_progress_label)
        } else {
            previous.labels().to_vec()
        };
        Self {
            labels: Some(labels),
            ..Self::mirroring(previous, in_progress_label)
        }
    }
}

/// Labels an issue carries while mirroring `item`.
///
/// Starts from the item's known labels, makes sure the category is present,
/// and adds `in_progress_label` only while the item is `InProgress`.
#[must_use]
pub fn labels_for(item: &WorkItem, in_progress_label: &str) -> Vec<String> {
    let mut labels: Vec<String> = item
        .labels()
        .iter()
        .filter(|label| label.as_str() != in_progress_label)
        .cloned()
        .collect();
    let category = item.category();
    if !category.is_empty() && !labels.iter().any(|label| label == category) {
        labels.insert(0, category.to_owned());
    }
    if item.state() == WorkItemState::InProgress {
        labels.push(in_progress_label.to_owned());
    }
    labels
}
