//! Summit - goal progress and lifecycle engine
//!
//! Summit turns raw weekly completion counts for hierarchical goals into
//! three derived signals: a milestone schedule per goal, a lifecycle phase
//! driven by weekly snapshots, and a phase-gated diagnostic score. Badge
//! tiers aggregate the phases and progress of a badge's child goals.
//!
//! The engines are synchronous and pure apart from the phase store, which
//! is the only shared mutable state.

pub mod badge;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod goal;
pub mod ladder;
pub mod phase;
pub mod storage;

pub use badge::{
    compute_badge, compute_badge_from_graph, BadgeCache, BadgeStatus, BadgeTier, ChildProgress,
    PhaseWeighting, TierThresholds,
};
pub use catalog::{
    builtin_catalog, load_catalog, DisplayCategory, GoalLevel, GoalTemplate, TemplateGraph,
    TemplateType,
};
pub use config::Config;
pub use diagnostic::{
    clamp_ratio, compute_diagnostic, DiagnosticScore, DiagnosticTerms, PhaseWeightProfiles,
    StatusThresholds, TermKind, TermStatus, WeightProfile,
};
pub use error::{Result, SummitError};
pub use goal::{progress_ratio, GoalInstance, GoalPeriod};
pub use ladder::{
    generate_ladder, CurveShape, Granularity, HabitRamp, MilestoneLadder, MilestoneLadderConfig,
    RungCount,
};
pub use phase::{
    classify_phase, preview_phase, GoalPhase, GoalPhaseState, PhaseEngine, PhasePreview,
    PhaseUpdate, SnapshotHistory, WeeklySnapshot,
};
pub use storage::{FilePhaseStore, MemoryPhaseStore, PhaseStore};

// CLI commands
pub use cli::{BadgeCommand, CatalogCommand, ClassifyCommand, DiagnoseCommand, LadderCommand};
