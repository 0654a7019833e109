//! Port contracts for work-item synchronisation.
//!
//! Ports define infrastructure-agnostic interfaces for the issue tracker and
//! the branch host consumed by the synchronisation services.

pub mod branches;
pub mod error;
pub mod issues;

pub use branches::{BranchClient, MergeOutcome};
pub use error::{TrackerError, TrackerResult};
pub use issues::IssueClient;

#[cfg(test)]
pub use branches::MockBranchClient;
#[cfg(test)]
pub use issues::MockIssueClient;
