//! Shared test helpers for in-memory synchronisation integration tests.

use canopy::config::SyncConfig;
use canopy::work_item::{
    adapters::memory::{CallJournal, InMemoryBranchHost, InMemoryIssueTracker},
    domain::{
        IssueNumber, IssueRecord, IssueStatus, ProjectSnapshot, RepositoryFullName, WorkItemId,
    },
    services::WorkItemSyncService,
};
use mockable::DefaultClock;
use std::sync::Arc;

/// Repository every integration test works against.
pub const REPOSITORY: &str = "acme/widgets";

/// Service type wired to the in-memory adapters.
pub type TestSyncService =
    WorkItemSyncService<InMemoryIssueTracker, InMemoryBranchHost, DefaultClock>;

/// Adapters and service sharing a single call journal.
pub struct SyncHarness {
    pub journal: CallJournal,
    pub tracker: Arc<InMemoryIssueTracker>,
    pub host: Arc<InMemoryBranchHost>,
    pub service: TestSyncService,
}

impl SyncHarness {
    /// Wires a service over empty adapters and an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository name or configuration is rejected.
    pub fn new() -> Result<Self, eyre::Report> {
        let config = SyncConfig::default();
        let journal = CallJournal::new();
        let tracker = Arc::new(InMemoryIssueTracker::new(
            config.tombstone_label.clone(),
            journal.clone(),
        ));
        let host = Arc::new(InMemoryBranchHost::new(
            &config.integration_branch,
            journal.clone(),
        ));
        let service = WorkItemSyncService::new(
            Arc::clone(&tracker),
            Arc::clone(&host),
            Arc::new(DefaultClock),
            config,
            ProjectSnapshot::empty(RepositoryFullName::new(REPOSITORY)?),
        )?;
        Ok(Self {
            journal,
            tracker,
            host,
            service,
        })
    }

    /// Seeds an issue on the tracker.
    ///
    /// # Errors
    ///
    /// Returns an error if a number is zero or the tracker rejects the seed.
    pub fn seed(
        &self,
        number: u64,
        status: IssueStatus,
        labels: &[&str],
        parent: Option<u64>,
    ) -> Result<(), eyre::Report> {
        self.tracker.seed(IssueRecord {
            number: IssueNumber::new(number)?,
            title: format!("Issue {number}"),
            body: String::new(),
            status,
            labels: labels.iter().map(|label| (*label).to_owned()).collect(),
            parent: parent.map(IssueNumber::new).transpose()?,
        })?;
        Ok(())
    }

    /// Loads the snapshot from the tracker.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh fails.
    pub async fn load(&self) -> Result<Arc<ProjectSnapshot>, eyre::Report> {
        Ok(self.service.refresh().await.into_result()?)
    }
}

/// Returns the identifier of a confirmed item.
///
/// # Errors
///
/// Returns an error if `number` is zero.
pub fn item_id(number: u64) -> Result<WorkItemId, eyre::Report> {
    Ok(WorkItemId::Issue(IssueNumber::new(number)?))
}
