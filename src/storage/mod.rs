//! Phase storage for Summit.
//!
//! Persists [`GoalPhaseState`](crate::phase::GoalPhaseState) with
//! compare-and-swap writes, in memory or as JSON files.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FilePhaseStore;
pub use memory::MemoryPhaseStore;
pub use traits::PhaseStore;
