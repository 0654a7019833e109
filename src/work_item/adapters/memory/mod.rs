//! In-memory adapters for the tracker-facing ports.
//!
//! These adapters model the external services without network access. They
//! are suitable for unit and integration tests and for local deterministic
//! synchronisation flows.

mod branches;
mod issues;
mod journal;

pub use branches::{BranchOperation, InMemoryBranchHost};
pub use issues::{InMemoryIssueTracker, IssueOperation};
pub use journal::{CallJournal, ExternalCall};
