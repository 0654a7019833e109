//! Canopy: work-item trees mirrored onto an issue tracker.
//!
//! This crate keeps a hierarchical tree of work items in step with issues
//! and branches on an external hosting service. Leaf states are chosen by
//! users; every other state is derived from the children.
//!
//! # Architecture
//!
//! Canopy follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the tracker and branch host
//! - **Adapters**: Concrete implementations of ports
//! - **Services**: Saga workflows with compensation and optimistic updates
//!
//! # Modules
//!
//! - [`config`]: Synchronisation settings
//! - [`work_item`]: Work-item tree, state derivation, and synchronisation

pub mod config;
pub mod work_item;
