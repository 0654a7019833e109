//! Optimistic projection and rollback of project snapshots.

use crate::config::SyncConfig;
use crate::work_item::domain::{
    IssueNumber, IssueRecord, ProjectSnapshot, RepositoryFullName, WorkItem, WorkItemId,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Snapshots on either side of a projection.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Snapshot that was current before the projection.
    pub previous: Arc<ProjectSnapshot>,
    /// Snapshot published by the projection.
    pub current: Arc<ProjectSnapshot>,
}

/// Publishes project snapshots and rolls them back on failure.
///
/// Readers obtain the current snapshot or subscribe to changes; each
/// snapshot is immutable, so a reader never sees a partially applied edit.
#[derive(Debug)]
pub struct OptimisticUpdateManager {
    sender: watch::Sender<Arc<ProjectSnapshot>>,
}

impl OptimisticUpdateManager {
    /// Creates a manager publishing `initial`.
    #[must_use]
    pub fn new(initial: ProjectSnapshot) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<ProjectSnapshot> {
        Arc::clone(&self.sender.borrow())
    }

    /// Returns a receiver notified whenever a new snapshot is published.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<ProjectSnapshot>> {
        self.sender.subscribe()
    }

    /// Publishes `snapshot` and returns both sides of the swap.
    pub fn publish(&self, snapshot: ProjectSnapshot) -> Projection {
        let current = Arc::new(snapshot);
        let previous = self.sender.send_replace(Arc::clone(&current));
        Projection { previous, current }
    }

    /// Restores a snapshot captured by an earlier projection.
    pub fn revert(&self, previous: Arc<ProjectSnapshot>) {
        self.sender.send_replace(previous);
    }

    /// Projects `replacement` in place of item `id`.
    ///
    /// Returns `None`, publishing nothing, when `id` is not in the current
    /// snapshot.
    pub fn project_replacement(&self, id: WorkItemId, replacement: WorkItem) -> Option<Projection> {
        self.project(|snapshot| snapshot.with_replaced(id, replacement))
    }

    /// Projects `child` appended under `parent`, or as a root when `parent`
    /// is `None`.
    pub fn project_insertion(
        &self,
        parent: Option<WorkItemId>,
        child: WorkItem,
    ) -> Option<Projection> {
        self.project(|snapshot| snapshot.with_inserted(parent, child))
    }

    /// Projects the removal of the subtree rooted at `id`.
    pub fn project_removal(&self, id: WorkItemId) -> Option<Projection> {
        self.project(|snapshot| snapshot.without(id))
    }

    fn project<F>(&self, edit: F) -> Option<Projection>
    where
        F: FnOnce(&ProjectSnapshot) -> Option<ProjectSnapshot>,
    {
        let mut projection = None;
        self.sender.send_if_modified(|current| {
            let Some(next) = edit(current) else {
                return false;
            };
            let published = Arc::new(next);
            let previous = std::mem::replace(current, Arc::clone(&published));
            projection = Some(Projection {
                previous,
                current: published,
            });
            true
        });
        projection
    }
}

/// Builds a snapshot of `repository` from tracker records.
///
/// Records linked to a parent that is not listed become roots. Siblings are
/// ordered by issue number. The first label that is neither the in-progress
/// nor the tombstone label is the category; records without one get the
/// default category.
#[must_use]
pub fn snapshot_from_records(
    repository: RepositoryFullName,
    records: &[IssueRecord],
    config: &SyncConfig,
) -> ProjectSnapshot {
    let by_number: BTreeMap<IssueNumber, &IssueRecord> = records
        .iter()
        .map(|record| (record.number, record))
        .collect();
    let mut children: BTreeMap<Option<IssueNumber>, BTreeSet<IssueNumber>> = BTreeMap::new();
    for record in by_number.values() {
        let parent = record
            .parent
            .filter(|parent| by_number.contains_key(parent) && *parent != record.number);
        children.entry(parent).or_default().insert(record.number);
    }

    let builder = RecordTreeBuilder {
        repository: &repository,
        by_number: &by_number,
        children: &children,
        config,
    };
    let mut visited = BTreeSet::new();
    let roots: Vec<WorkItem> = children
        .get(&None)
        .into_iter()
        .flatten()
        .filter_map(|number| builder.build(*number, &mut visited))
        .collect();
    if visited.len() < by_number.len() {
        warn!(
            repository = %repository,
            unreachable = by_number.len() - visited.len(),
            "issues in a parent cycle were left out of the tree"
        );
    }
    ProjectSnapshot::from_roots(repository, roots)
}

struct RecordTreeBuilder<'a> {
    repository: &'a RepositoryFullName,
    by_number: &'a BTreeMap<IssueNumber, &'a IssueRecord>,
    children: &'a BTreeMap<Option<IssueNumber>, BTreeSet<IssueNumber>>,
    config: &'a SyncConfig,
}

impl RecordTreeBuilder<'_> {
    fn build(&self, number: IssueNumber, visited: &mut BTreeSet<IssueNumber>) -> Option<WorkItem> {
        if !visited.insert(number) {
            return None;
        }
        let record = self.by_number.get(&number)?;
        let title = if record.title.trim().is_empty() {
            format!("#{number}")
        } else {
            record.title.clone()
        };
        let category = record
            .category(&self.config.reserved_labels())
            .unwrap_or(self.config.default_category.as_str())
            .to_owned();
        let item = WorkItem::new(WorkItemId::Issue(number), title, self.repository.clone())
            .ok()?
            .with_description(record.body.clone())
            .with_category(category)
            .with_labels(record.labels.clone())
            .with_state(record.leaf_state(&self.config.in_progress_label));

        let child_numbers = self.children.get(&Some(number)).into_iter().flatten();
        Some(child_numbers.fold(item, |parent, child| {
            match self.build(*child, visited) {
                Some(built) => parent.with_child(built),
                None => parent,
            }
        }))
    }
}
