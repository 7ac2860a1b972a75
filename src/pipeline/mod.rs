//! Publication tracking pipeline.
//!
//! - `index`: Per-cycle snapshot of publications keyed by id
//! - `diff`: Detection of newly active publications
//! - `tracker`: Cycle execution and queries over shared state
//! - `scheduler`: Fixed-interval driver

pub mod diff;
pub mod index;
pub mod scheduler;
pub mod tracker;

pub use diff::DiffEngine;
pub use index::{IndexStore, IndexedPublication, PublicationIndex};
pub use scheduler::Scheduler;
pub use tracker::{CycleReport, Tracker};
