//! Application services for work-item synchronisation.

mod branch_lifecycle;
mod error;
mod optimistic;
mod outcome;
mod sync;
mod tombstones;

pub use branch_lifecycle::{
    BranchAction, BranchLifecycleOrchestrator, BranchStep, BranchTransition,
};
pub use error::{SyncError, SyncResult};
pub use optimistic::{OptimisticUpdateManager, Projection, snapshot_from_records};
pub use outcome::SyncOutcome;
pub use sync::{BackgroundTask, CreateWorkItemRequest, DeletedSubtree, WorkItemSyncService};
pub use tombstones::{ReconcileReport, TombstoneCache};
