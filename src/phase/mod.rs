//! Goal lifecycle phases.
//!
//! Weekly snapshots drive a three-state machine (acquisition →
//! consolidation → graduated, with one-level regressions). The persisted
//! [`GoalPhaseState`] is the only source of truth for a goal's phase;
//! [`PhasePreview`] exists for views that want a what-if answer.

pub mod classifier;
pub mod engine;
pub mod snapshot;
pub mod state;

pub use classifier::{
    classify_phase, evaluate, preview_phase, Classification, GoalPhase, PhasePreview,
    PhaseTransition, TransitionReason, CONSOLIDATION_WINDOW, GRADUATION_WINDOW, ON_PACE_RATIO,
    REGRESSION_RATIO, REGRESSION_WINDOW,
};
pub use engine::{PhaseEngine, PhaseUpdate};
pub use snapshot::{SnapshotHistory, WeeklySnapshot};
pub use state::GoalPhaseState;
