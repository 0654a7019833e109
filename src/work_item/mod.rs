//! Work-item tree synchronisation.
//!
//! A repository's work items form a forest whose leaves are mirrored onto
//! tracker issues and, while in progress, onto per-leaf branches. Internal
//! items derive their state from their children. Edits are applied
//! optimistically and compensated when an external call fails. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
