//! Work-item node and its progress state.

use super::{
    IssueNumber, ParseWorkItemStateError, RepositoryFullName, WorkItemDomainError, WorkItemId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Progress state of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemState {
    /// Work has not started.
    Todo,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Done,
}

impl WorkItemState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkItemState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkItemState {
    type Error = ParseWorkItemStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseWorkItemStateError(value.to_owned())),
        }
    }
}

/// Node in the work-item hierarchy.
///
/// Children are held behind [`Arc`] so that edits can rebuild the path from
/// a root to the edited node while every untouched subtree stays shared with
/// the previous snapshot. A `WorkItem` handed out by a snapshot is never
/// mutated; every edit returns a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    id: WorkItemId,
    title: String,
    description: String,
    state: WorkItemState,
    category: String,
    labels: Vec<String>,
    repository: RepositoryFullName,
    depth: usize,
    parent: Option<WorkItemId>,
    children: Vec<Arc<WorkItem>>,
}

impl WorkItem {
    /// Creates a root-level leaf item in the `Todo` state.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::EmptyTitle`] if the title is blank.
    pub fn new(
        id: WorkItemId,
        title: impl Into<String>,
        repository: RepositoryFullName,
    ) -> Result<Self, WorkItemDomainError> {
        let raw_title = title.into();
        let normalized_title = raw_title.trim();
        if normalized_title.is_empty() {
            return Err(WorkItemDomainError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: normalized_title.to_owned(),
            description: String::new(),
            state: WorkItemState::Todo,
            category: String::new(),
            labels: Vec::new(),
            repository,
            depth: 0,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Sets the item description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().trim().to_owned();
        self
    }

    /// Sets the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into().trim().to_owned();
        self
    }

    /// Sets the labels the tracker issue carries, in tracker order.
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the recorded state while building an item from external data.
    ///
    /// For internal items the value is overwritten by the next state
    /// computation pass.
    #[must_use]
    pub fn with_state(mut self, state: WorkItemState) -> Self {
        self.state = state;
        self
    }

    /// Returns a copy of this leaf carrying a manually chosen state.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::ManualStateOnInternalItem`] when the item
    /// has at least one child.
    pub fn with_manual_state(&self, state: WorkItemState) -> Result<Self, WorkItemDomainError> {
        self.ensure_leaf()?;
        let mut updated = self.clone();
        updated.state = state;
        Ok(updated)
    }

    /// Verifies that the item has no children.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::ManualStateOnInternalItem`] when the item
    /// has at least one child.
    pub fn ensure_leaf(&self) -> Result<(), WorkItemDomainError> {
        if self.is_leaf() {
            return Ok(());
        }
        Err(WorkItemDomainError::ManualStateOnInternalItem {
            item_id: self.id,
            child_count: self.children.len(),
        })
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> WorkItemId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> WorkItemState {
        self.state
    }

    /// Returns the category label.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the tracker labels last read or written for this item.
    ///
    /// Empty when the item has not been mirrored yet.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the owning repository.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryFullName {
        &self.repository
    }

    /// Returns the zero-based depth in the hierarchy.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the parent identifier, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<WorkItemId> {
        self.parent
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Arc<Self>] {
        &self.children
    }

    /// Returns whether the item has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Appends `child` as the last child, positioning it one level below
    /// this item.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        let placed = child.placed_at(self.depth + 1, Some(self.id));
        self.children.push(Arc::new(placed));
        self
    }

    /// Replaces the child list.
    pub(crate) fn with_children(mut self, children: Vec<Arc<Self>>) -> Self {
        self.children = children;
        self
    }

    /// Sets a state produced by the state computation engine.
    pub(crate) fn with_derived_state(mut self, state: WorkItemState) -> Self {
        self.state = state;
        self
    }

    /// Swaps a placeholder identifier for the tracker-assigned one.
    ///
    /// Direct children are re-pointed at the new identifier.
    #[must_use]
    pub fn confirmed_as(mut self, number: IssueNumber) -> Self {
        self.id = WorkItemId::Issue(number);
        let id = self.id;
        let depth = self.depth;
        self.children = self
            .children
            .into_iter()
            .map(|child| Arc::new(Arc::unwrap_or_clone(child).placed_at(depth + 1, Some(id))))
            .collect();
        self
    }

    /// Positions the item at `depth` under `parent`, re-indexing descendant
    /// depths when they change.
    pub(crate) fn placed_at(mut self, depth: usize, parent: Option<WorkItemId>) -> Self {
        let depth_changed = self.depth != depth;
        self.depth = depth;
        self.parent = parent;
        if depth_changed {
            let id = self.id;
            self.children = self
                .children
                .into_iter()
                .map(|child| Arc::new(Arc::unwrap_or_clone(child).placed_at(depth + 1, Some(id))))
                .collect();
        }
        self
    }
}
