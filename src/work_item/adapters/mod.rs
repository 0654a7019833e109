//! Adapter implementations for the issue tracker and branch host ports.

pub mod memory;
