//! Immutable project snapshots.

use super::{RepositoryFullName, WorkItem, WorkItemId, state, tree};
use std::sync::Arc;

/// Immutable view of one repository's work-item forest.
///
/// Every edit yields a new snapshot and leaves the receiver untouched, so a
/// caller can roll back by keeping the previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSnapshot {
    repository: RepositoryFullName,
    roots: Vec<Arc<WorkItem>>,
}

impl ProjectSnapshot {
    /// Creates an empty snapshot for `repository`.
    #[must_use]
    pub const fn empty(repository: RepositoryFullName) -> Self {
        Self {
            repository,
            roots: Vec::new(),
        }
    }

    /// Creates a snapshot from an existing forest and derives every state.
    #[must_use]
    pub fn from_roots(repository: RepositoryFullName, roots: Vec<WorkItem>) -> Self {
        let placed: Vec<Arc<WorkItem>> = roots
            .into_iter()
            .map(|root| Arc::new(root.placed_at(0, None)))
            .collect();
        Self {
            repository,
            roots: state::recompute(&placed),
        }
    }

    /// Returns the repository this snapshot belongs to.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryFullName {
        &self.repository
    }

    /// Returns the root items in display order.
    #[must_use]
    pub fn roots(&self) -> &[Arc<WorkItem>] {
        &self.roots
    }

    /// Returns the total number of items in the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots
            .iter()
            .map(|root| 1 + tree::count_descendants(root))
            .sum()
    }

    /// Returns whether the forest has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Finds an item by identifier.
    #[must_use]
    pub fn find(&self, id: WorkItemId) -> Option<&Arc<WorkItem>> {
        tree::find(&self.roots, id)
    }

    /// Returns a snapshot with the item `id` replaced and states recomputed.
    #[must_use]
    pub fn with_replaced(&self, id: WorkItemId, replacement: WorkItem) -> Option<Self> {
        tree::replace(&self.roots, id, replacement).map(|roots| self.derive(&roots))
    }

    /// Returns a snapshot with `child` appended under `parent` and states
    /// recomputed.
    #[must_use]
    pub fn with_inserted(&self, parent: Option<WorkItemId>, child: WorkItem) -> Option<Self> {
        tree::insert_child(&self.roots, parent, child).map(|roots| self.derive(&roots))
    }

    /// Returns a snapshot without the subtree rooted at `id` and with states
    /// recomputed.
    #[must_use]
    pub fn without(&self, id: WorkItemId) -> Option<Self> {
        tree::remove(&self.roots, id).map(|roots| self.derive(&roots))
    }

    fn derive(&self, roots: &[Arc<WorkItem>]) -> Self {
        Self {
            repository: self.repository.clone(),
            roots: state::recompute(roots),
        }
    }
}
