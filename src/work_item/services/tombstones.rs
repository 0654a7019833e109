//! Tombstone cache masking deletions the tracker has not yet reflected.

use super::{SyncError, SyncResult};
use crate::work_item::{
    domain::{IssueNumber, IssueRecord, RepositoryFullName, TombstoneSet},
    ports::IssueClient,
};
use chrono::TimeDelta;
use mockable::Clock;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Changes applied by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Issues newly marked because the tracker labels them as deleted.
    pub added: Vec<IssueNumber>,
    /// Markers dropped because the tracker still did not confirm them once
    /// the grace period had passed.
    pub dropped: Vec<IssueNumber>,
    /// Unconfirmed markers kept because they are younger than the grace
    /// period.
    pub pending: Vec<IssueNumber>,
}

impl ReconcileReport {
    /// Returns whether the pass added or dropped nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.dropped.is_empty()
    }
}

/// Per-repository tombstone sets plus the tracker used to confirm them.
///
/// The cache only filters tracker listings. It never edits a work-item tree.
/// A marker the listing does not confirm is kept for `grace_period` after it
/// was set, since the list endpoint may still be serving records from
/// before the delete.
pub struct TombstoneCache<I, C>
where
    I: IssueClient,
    C: Clock + Send + Sync,
{
    issues: Arc<I>,
    clock: Arc<C>,
    tombstone_label: String,
    grace_period: TimeDelta,
    sets: RwLock<HashMap<RepositoryFullName, TombstoneSet>>,
}

impl<I, C> TombstoneCache<I, C>
where
    I: IssueClient,
    C: Clock + Send + Sync,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new(
        issues: Arc<I>,
        clock: Arc<C>,
        tombstone_label: impl Into<String>,
        grace_period: TimeDelta,
    ) -> Self {
        Self {
            issues,
            clock,
            tombstone_label: tombstone_label.into(),
            grace_period,
            sets: RwLock::new(HashMap::new()),
        }
    }

    /// Marks `numbers` as deleted in `repository`.
    ///
    /// Returns how many were not already marked.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Internal`] when lock acquisition fails.
    pub fn mark_deleted(
        &self,
        repository: &RepositoryFullName,
        numbers: &[IssueNumber],
    ) -> SyncResult<usize> {
        let now = self.clock.utc();
        let mut sets = self.sets.write().map_err(SyncError::internal)?;
        let set = sets.entry(repository.clone()).or_default();
        Ok(numbers
            .iter()
            .filter(|number| set.mark(**number, now))
            .count())
    }

    /// Returns whether `number` is masked in `repository`.
    #[must_use]
    pub fn is_marked(&self, repository: &RepositoryFullName, number: IssueNumber) -> bool {
        self.sets.read().is_ok_and(|sets| {
            sets.get(repository)
                .is_some_and(|set| set.contains(number))
        })
    }

    /// Returns a copy of the markers held for `repository`.
    #[must_use]
    pub fn snapshot(&self, repository: &RepositoryFullName) -> TombstoneSet {
        self.sets
            .read()
            .ok()
            .and_then(|sets| sets.get(repository).cloned())
            .unwrap_or_default()
    }

    /// Drops tracker records that are marked or carry the tombstone label.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Internal`] when lock acquisition fails.
    pub fn filter_live(
        &self,
        repository: &RepositoryFullName,
        records: Vec<IssueRecord>,
    ) -> SyncResult<Vec<IssueRecord>> {
        let sets = self.sets.read().map_err(SyncError::internal)?;
        let marked = sets.get(repository);
        Ok(records
            .into_iter()
            .filter(|record| {
                !record.has_label(&self.tombstone_label)
                    && !marked.is_some_and(|set| set.contains(record.number))
            })
            .collect())
    }

    /// Lists the tracker's issues with tombstoned records removed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when listing fails or lock acquisition fails.
    pub async fn list_live(&self, repository: &RepositoryFullName) -> SyncResult<Vec<IssueRecord>> {
        let records = self.issues.list_issues(repository).await?;
        self.filter_live(repository, records)
    }

    /// Brings the markers for `repository` in line with the tracker.
    ///
    /// Labelled issues gain a marker. A marker whose issue is listed without
    /// the label, or not listed at all, is dropped once it is older than the
    /// grace period and reported as pending until then. Running the pass
    /// twice against an unchanged tracker adds and drops nothing the second
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when listing fails or lock acquisition fails.
    pub async fn reconcile(&self, repository: &RepositoryFullName) -> SyncResult<ReconcileReport> {
        let records = self.issues.list_issues(repository).await?;
        let confirmed: BTreeSet<IssueNumber> = records
            .iter()
            .filter(|record| record.has_label(&self.tombstone_label))
            .map(|record| record.number)
            .collect();
        let report = self.apply_confirmed(repository, &confirmed)?;
        debug!(
            repository = %repository,
            added = report.added.len(),
            dropped = report.dropped.len(),
            pending = report.pending.len(),
            "reconciled tombstones"
        );
        Ok(report)
    }

    fn apply_confirmed(
        &self,
        repository: &RepositoryFullName,
        confirmed: &BTreeSet<IssueNumber>,
    ) -> SyncResult<ReconcileReport> {
        let now = self.clock.utc();
        let expiry = now.checked_sub_signed(self.grace_period);
        let mut sets = self.sets.write().map_err(SyncError::internal)?;
        let set = sets.entry(repository.clone()).or_default();
        let (dropped, pending): (Vec<IssueNumber>, Vec<IssueNumber>) = set
            .iter()
            .filter(|number| !confirmed.contains(number))
            .partition(|number| {
                set.marked_at(*number)
                    .zip(expiry)
                    .is_some_and(|(marked_at, cutoff)| marked_at <= cutoff)
            });
        for number in &dropped {
            set.unmark(*number);
        }
        let added: Vec<IssueNumber> = confirmed
            .iter()
            .copied()
            .filter(|number| set.mark(*number, now))
            .collect();
        Ok(ReconcileReport {
            added,
            dropped,
            pending,
        })
    }
}
