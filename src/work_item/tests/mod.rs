//! Unit tests for the work-item module.
//!
//! Tests are organised by concern: tree editing, state derivation,
//! tombstones, branch lifecycle decisions, snapshot projection, and the
//! synchronisation workflows.
