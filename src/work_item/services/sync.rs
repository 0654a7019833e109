//! Saga orchestration of user edits against the tracker and branch host.
//!
//! Every workflow validates locally, performs its external calls in a fixed
//! order, and either publishes the resulting snapshot or undoes what it
//! already did. Compensating calls always run after the failed forward
//! action and before the workflow returns.

use super::{
    BranchLifecycleOrchestrator, BranchTransition, OptimisticUpdateManager, ReconcileReport,
    SyncError, SyncOutcome, SyncResult, TombstoneCache,
    branch_lifecycle::BranchAction,
    optimistic::snapshot_from_records,
    outcome::Notices,
};
use crate::config::{ConfigError, SyncConfig};
use crate::work_item::{
    domain::{
        IssueDraft, IssueNumber, IssuePatch, ProjectSnapshot, RepositoryFullName, WorkItem,
        WorkItemDomainError, WorkItemId, WorkItemState, labels_for, tree,
    },
    ports::{BranchClient, IssueClient},
};
use mockable::Clock;
use std::sync::Arc;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

/// Request to create a work item under an optional parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWorkItemRequest {
    repository: String,
    title: String,
    description: String,
    category: Option<String>,
    parent: Option<WorkItemId>,
}

impl CreateWorkItemRequest {
    /// Creates a root-level request with the required fields.
    #[must_use]
    pub fn new(repository: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            title: title.into(),
            description: String::new(),
            category: None,
            parent: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Places the new item under `parent`.
    #[must_use]
    pub const fn under(mut self, parent: WorkItemId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Detached external work started by a workflow.
///
/// Dropping the value lets the work continue unobserved.
#[derive(Debug)]
pub struct BackgroundTask {
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// Returns whether the work has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the work to finish.
    ///
    /// Returns `false` when the work panicked or was cancelled.
    pub async fn join(self) -> bool {
        self.handle.await.is_ok()
    }
}

/// Result of a delete: the removed identifiers and the pending external
/// deletes.
#[derive(Debug)]
pub struct DeletedSubtree {
    removed: Vec<WorkItemId>,
    background: BackgroundTask,
}

impl DeletedSubtree {
    /// Returns the removed identifiers, children before their parents.
    #[must_use]
    pub fn removed(&self) -> &[WorkItemId] {
        &self.removed
    }

    /// Consumes the value, returning the background deletion work.
    #[must_use]
    pub fn into_background(self) -> BackgroundTask {
        self.background
    }
}

/// Mirrors user edits of one repository's work items onto the tracker.
pub struct WorkItemSyncService<I, B, C>
where
    I: IssueClient + 'static,
    B: BranchClient,
    C: Clock + Send + Sync + 'static,
{
    issues: Arc<I>,
    branches: BranchLifecycleOrchestrator<B>,
    tombstones: Arc<TombstoneCache<I, C>>,
    snapshots: OptimisticUpdateManager,
    clock: Arc<C>,
    config: SyncConfig,
}

impl<I, B, C> WorkItemSyncService<I, B, C>
where
    I: IssueClient + 'static,
    B: BranchClient,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a service publishing `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn new(
        issues: Arc<I>,
        branches: Arc<B>,
        clock: Arc<C>,
        config: SyncConfig,
        initial: ProjectSnapshot,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let tombstones = Arc::new(TombstoneCache::new(
            Arc::clone(&issues),
            Arc::clone(&clock),
            config.tombstone_label.clone(),
            config.tombstone_grace(),
        ));
        Ok(Self {
            branches: BranchLifecycleOrchestrator::new(branches, &config),
            issues,
            tombstones,
            snapshots: OptimisticUpdateManager::new(initial),
            clock,
            config,
        })
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ProjectSnapshot> {
        self.snapshots.current()
    }

    /// Returns a receiver notified of every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<ProjectSnapshot>> {
        self.snapshots.subscribe()
    }

    /// Returns the tombstone cache backing this service.
    #[must_use]
    pub const fn tombstones(&self) -> &Arc<TombstoneCache<I, C>> {
        &self.tombstones
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Rebuilds the snapshot from the tracker's live issues.
    pub async fn refresh(&self) -> SyncOutcome<Arc<ProjectSnapshot>> {
        let notices = Notices::new(&*self.clock);
        let result = self.run_refresh().await;
        notices.finish(result)
    }

    /// Reconciles the tombstone markers with the tracker.
    pub async fn reconcile(&self) -> SyncOutcome<ReconcileReport> {
        let mut notices = Notices::new(&*self.clock);
        let repository = self.snapshots.current().repository().clone();
        let result = self.tombstones.reconcile(&repository).await;
        if let Ok(report) = &result
            && !report.is_noop()
        {
            notices.info(format!(
                "tombstones reconciled: {} added, {} dropped",
                report.added.len(),
                report.dropped.len()
            ));
        }
        notices.finish(result)
    }

    /// Moves a leaf to `state`, mirroring it on the tracker and branch host.
    ///
    /// The issue is updated first. Branch work follows; when it fails the
    /// issue is restored and the snapshot is left as it was.
    pub async fn submit_update(
        &self,
        id: WorkItemId,
        state: WorkItemState,
    ) -> SyncOutcome<Arc<WorkItem>> {
        let mut notices = Notices::new(&*self.clock);
        let result = self.run_update(id, state, &mut notices).await;
        notices.finish(result)
    }

    /// Creates a work item on the tracker and adds it to the snapshot.
    ///
    /// The item is visible under a placeholder identifier until the tracker
    /// confirms it; on failure the placeholder is withdrawn.
    pub async fn submit_create(&self, request: CreateWorkItemRequest) -> SyncOutcome<Arc<WorkItem>> {
        let mut notices = Notices::new(&*self.clock);
        let result = self.run_create(request, &mut notices).await;
        notices.finish(result)
    }

    /// Removes a subtree locally and deletes its issues in the background.
    ///
    /// The tombstones are recorded and the snapshot published before any
    /// external call. External deletes run children first and stop at the
    /// first failure.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit_delete(&self, id: WorkItemId) -> SyncOutcome<DeletedSubtree> {
        let mut notices = Notices::new(&*self.clock);
        let result = self.run_delete(id, &mut notices);
        notices.finish(result)
    }

    async fn run_refresh(&self) -> SyncResult<Arc<ProjectSnapshot>> {
        let repository = self.snapshots.current().repository().clone();
        let records = self.tombstones.list_live(&repository).await?;
        let snapshot = snapshot_from_records(repository, &records, &self.config);
        debug!(items = snapshot.len(), "refreshed snapshot from tracker");
        Ok(self.snapshots.publish(snapshot).current)
    }

    async fn run_update(
        &self,
        id: WorkItemId,
        state: WorkItemState,
        notices: &mut Notices<'_, C>,
    ) -> SyncResult<Arc<WorkItem>> {
        let snapshot = self.snapshots.current();
        let previous = Arc::clone(find_item(&snapshot, id)?);
        let moved = previous.with_manual_state(state)?;
        let number = confirmed_number(id)?;
        if previous.state() == state {
            notices.info(format!("work item {id} is already {state}"));
            return Ok(previous);
        }

        let repository = snapshot.repository();
        debug!(item = %id, from = %previous.state(), to = %state, "updating issue");
        let patch = IssuePatch::mirroring(&moved, &self.config.in_progress_label);
        self.issues.update_issue(repository, number, &patch).await?;
        let updated = moved.with_labels(patch.labels.unwrap_or_default());

        match self
            .branches
            .transition(repository, number, previous.state(), state)
            .await
        {
            BranchTransition::Succeeded(step) => {
                if step.action() == BranchAction::AdoptedExisting {
                    notices.info(format!("reusing existing branch {}", step.branch()));
                }
            }
            BranchTransition::FailedNonFatal { step, error } => {
                notices.warning(format!(
                    "branch {} was merged but not deleted: {error}",
                    step.branch()
                ));
            }
            BranchTransition::NeedsCompensation { error } => {
                return Err(self
                    .restore_issue(repository, number, &previous, error)
                    .await);
            }
        }

        let projection = self
            .snapshots
            .project_replacement(id, updated)
            .ok_or_else(|| missing_item(id))?;
        notices.success(format!("work item {id} moved to {state}"));
        Ok(Arc::clone(find_item(&projection.current, id)?))
    }

    async fn restore_issue(
        &self,
        repository: &RepositoryFullName,
        number: IssueNumber,
        previous: &WorkItem,
        cause: SyncError,
    ) -> SyncError {
        warn!(issue = %number, error = %cause, "branch step failed; restoring issue");
        let patch = IssuePatch::restoring(previous, &self.config.in_progress_label);
        match self.issues.update_issue(repository, number, &patch).await {
            Ok(()) => cause,
            Err(compensation) => {
                error!(
                    issue = %number,
                    error = %cause,
                    compensation = %compensation,
                    "issue restore failed; tracker and tree disagree"
                );
                SyncError::CompensationFailed {
                    cause: Box::new(cause),
                    compensation,
                }
            }
        }
    }

    async fn run_create(
        &self,
        request: CreateWorkItemRequest,
        notices: &mut Notices<'_, C>,
    ) -> SyncResult<Arc<WorkItem>> {
        let CreateWorkItemRequest {
            repository: raw_repository,
            title,
            description,
            category,
            parent,
        } = request;
        let snapshot = self.snapshots.current();
        let repository = RepositoryFullName::new(raw_repository)?;
        if &repository != snapshot.repository() {
            return Err(WorkItemDomainError::RepositoryMismatch {
                requested: repository.to_string(),
                loaded: snapshot.repository().to_string(),
            }
            .into());
        }
        let parent_number = parent
            .map(|parent_id| {
                find_item(&snapshot, parent_id)?;
                confirmed_number(parent_id)
            })
            .transpose()?;

        let chosen_category = category.unwrap_or_else(|| self.config.default_category.clone());
        let unlabelled = WorkItem::new(WorkItemId::placeholder(), title, repository.clone())?
            .with_description(description)
            .with_category(chosen_category);
        let labels = labels_for(&unlabelled, &self.config.in_progress_label);
        let placeholder = unlabelled.with_labels(labels.clone());
        let placeholder_id = placeholder.id();
        let draft = IssueDraft {
            title: placeholder.title().to_owned(),
            body: placeholder.description().to_owned(),
            labels,
        };
        let projection = self
            .snapshots
            .project_insertion(parent, placeholder.clone())
            .ok_or_else(|| parent.map_or_else(|| missing_repository(&repository), missing_item))?;

        let number = match self
            .create_external(&repository, &draft, parent_number)
            .await
        {
            Ok(number) => number,
            Err(error) => {
                self.snapshots.revert(projection.previous);
                return Err(error);
            }
        };

        let confirmed_id = WorkItemId::Issue(number);
        let confirmed = self
            .snapshots
            .project_replacement(placeholder_id, placeholder.confirmed_as(number))
            .ok_or_else(|| missing_item(placeholder_id))?;
        info!(item = %confirmed_id, "work item created");
        notices.success(format!("created work item {confirmed_id}"));
        Ok(Arc::clone(find_item(&confirmed.current, confirmed_id)?))
    }

    async fn create_external(
        &self,
        repository: &RepositoryFullName,
        draft: &IssueDraft,
        parent: Option<IssueNumber>,
    ) -> SyncResult<IssueNumber> {
        let number = self.issues.create_issue(repository, draft).await?;
        let Some(parent) = parent else {
            return Ok(number);
        };

        debug!(issue = %number, parent = %parent, "linking sub-issue");
        let Err(cause) = self.issues.link_sub_issue(repository, parent, number).await else {
            return Ok(number);
        };
        warn!(issue = %number, error = %cause, "sub-issue link failed; deleting orphan");
        self.tombstones.mark_deleted(repository, &[number])?;
        match self.issues.delete_issue(repository, number).await {
            Ok(()) => Err(cause.into()),
            Err(compensation) => {
                error!(
                    issue = %number,
                    compensation = %compensation,
                    "orphan issue could not be deleted"
                );
                Err(SyncError::CompensationFailed {
                    cause: Box::new(cause.into()),
                    compensation,
                })
            }
        }
    }

    fn run_delete(
        &self,
        id: WorkItemId,
        notices: &mut Notices<'_, C>,
    ) -> SyncResult<DeletedSubtree> {
        let runtime = Handle::try_current().map_err(SyncError::internal)?;
        let snapshot = self.snapshots.current();
        let item = find_item(&snapshot, id)?;
        let removed = tree::subtree_ids_post_order(item);
        let numbers: Vec<IssueNumber> = removed
            .iter()
            .filter_map(|removed_id| removed_id.issue_number())
            .collect();
        let repository = snapshot.repository().clone();

        self.tombstones.mark_deleted(&repository, &numbers)?;
        self.snapshots
            .project_removal(id)
            .ok_or_else(|| missing_item(id))?;
        notices.success(format!("deleted {} work item(s)", removed.len()));

        let issues = Arc::clone(&self.issues);
        let tombstones = Arc::clone(&self.tombstones);
        let handle = runtime.spawn(async move {
            for number in numbers {
                if let Err(err) = issues.delete_issue(&repository, number).await {
                    warn!(
                        issue = %number,
                        error = %err,
                        "external delete failed; remaining issues left in place"
                    );
                    return;
                }
            }
            match tombstones.reconcile(&repository).await {
                Ok(report) => info!(
                    added = report.added.len(),
                    dropped = report.dropped.len(),
                    "background reconciliation finished"
                ),
                Err(err) => warn!(error = %err, "background reconciliation failed"),
            }
        });
        Ok(DeletedSubtree {
            removed,
            background: BackgroundTask { handle },
        })
    }
}

fn find_item(snapshot: &ProjectSnapshot, id: WorkItemId) -> SyncResult<&Arc<WorkItem>> {
    snapshot.find(id).ok_or_else(|| missing_item(id))
}

fn confirmed_number(id: WorkItemId) -> SyncResult<IssueNumber> {
    id.issue_number()
        .ok_or(SyncError::Validation(WorkItemDomainError::UnconfirmedItem(id)))
}

fn missing_item(id: WorkItemId) -> SyncError {
    SyncError::NotFound(format!("work item {id}"))
}

fn missing_repository(repository: &RepositoryFullName) -> SyncError {
    SyncError::NotFound(format!("repository {repository}"))
}
