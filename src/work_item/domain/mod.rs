//! Domain model for work-item tree synchronisation.
//!
//! The domain covers the work-item forest, its derived states, branch and
//! issue value objects, and the tombstone set. Nothing here performs I/O.

mod branch;
mod error;
mod ids;
mod issue;
mod item;
mod notification;
mod snapshot;
pub mod state;
mod tombstone;
pub mod tree;

pub use branch::{BranchHandle, BranchLifecycleState, BranchName};
pub use error::{ParseWorkItemStateError, WorkItemDomainError};
pub use ids::{IssueNumber, RepositoryFullName, WorkItemId};
pub use issue::{IssueDraft, IssuePatch, IssueRecord, IssueStatus, labels_for};
pub use item::{WorkItem, WorkItemState};
pub use notification::{Notification, NotificationLevel};
pub use snapshot::ProjectSnapshot;
pub use tombstone::TombstoneSet;
