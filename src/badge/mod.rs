//! L2 badge aggregation.
//!
//! Badges are computed from their L3 children on demand. The tier is never
//! persisted as the source of truth.

pub mod aggregate;
pub mod cache;
pub mod tier;

pub use aggregate::{
    compute_badge, compute_badge_from_graph, BadgeStatus, ChildProgress, PhaseWeighting,
    DEFAULT_ACQUISITION_WEIGHT,
};
pub use cache::BadgeCache;
pub use tier::{BadgeTier, TierThresholds};
