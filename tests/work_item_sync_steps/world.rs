//! Shared world state for work-item synchronisation BDD scenarios.

use std::sync::Arc;

use canopy::config::SyncConfig;
use canopy::work_item::{
    adapters::memory::{CallJournal, InMemoryBranchHost, InMemoryIssueTracker},
    domain::{ProjectSnapshot, RepositoryFullName, WorkItem, WorkItemId},
    services::{SyncError, SyncOutcome, WorkItemSyncService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Repository every scenario works against.
pub const REPOSITORY: &str = "acme/widgets";

/// Service type used by the BDD world.
pub type TestSyncService =
    WorkItemSyncService<InMemoryIssueTracker, InMemoryBranchHost, DefaultClock>;

/// Scenario world for synchronisation behaviour tests.
pub struct SyncWorld {
    pub journal: CallJournal,
    pub tracker: Arc<InMemoryIssueTracker>,
    pub host: Arc<InMemoryBranchHost>,
    pub service: TestSyncService,
    pub last_update: Option<SyncOutcome<Arc<WorkItem>>>,
    pub last_create: Option<SyncOutcome<Arc<WorkItem>>>,
    pub last_delete: Option<Result<Vec<WorkItemId>, SyncError>>,
}

impl SyncWorld {
    /// Creates a world with empty adapters and an empty snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the fixed repository name or default configuration is
    /// rejected.
    #[must_use]
    pub fn new() -> Self {
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
        let repository = RepositoryFullName::new(REPOSITORY).expect("valid repository");
        let service = WorkItemSyncService::new(
            Arc::clone(&tracker),
            Arc::clone(&host),
            Arc::new(DefaultClock),
            config,
            ProjectSnapshot::empty(repository),
        )
        .expect("default configuration is valid");

        Self {
            journal,
            tracker,
            host,
            service,
            last_update: None,
            last_create: None,
            last_delete: None,
        }
    }
}

impl Default for SyncWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SyncWorld {
    SyncWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
