//! Persisted lifecycle phase for a goal instance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::phase::GoalPhase;

/// The single authoritative record of a goal's current phase.
///
/// Only the phase engine writes it. `version` increases by one on every
/// write and is the compare-and-swap token for concurrent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPhaseState {
    /// Goal instance id.
    pub goal_id: String,
    /// Current phase.
    pub phase: GoalPhase,
    /// Write counter; 0 means never persisted.
    pub version: u64,
    /// Newest snapshot week already evaluated.
    #[serde(default)]
    pub evaluated_through: Option<NaiveDate>,
    /// When this record was last written.
    pub updated_at: DateTime<Utc>,
}

impl GoalPhaseState {
    /// Initial state for a goal with no evaluations.
    pub fn new(goal_id: impl Into<String>) -> Self {
        Self {
            goal_id: goal_id.into(),
            phase: GoalPhase::Acquisition,
            version: 0,
            evaluated_through: None,
            updated_at: Utc::now(),
        }
    }

    /// The successor record after evaluating through `week`.
    pub fn advance(&self, phase: GoalPhase, week: NaiveDate) -> Self {
        Self {
            goal_id: self.goal_id.clone(),
            phase,
            version: self.version + 1,
            evaluated_through: Some(week),
            updated_at: Utc::now(),
        }
    }

    /// Whether `week` has already been evaluated.
    pub fn has_evaluated(&self, week: NaiveDate) -> bool {
        self.evaluated_through.is_some_and(|done| week <= done)
    }
}
