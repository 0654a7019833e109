//! Step definitions for work-item synchronisation scenarios.

mod given;
mod then;
mod when;
pub mod world;
