//! Habit ramps for `habit_ramp` templates.
//!
//! A ramp is a list of steps, each holding a weekly target for some number
//! of weeks. After the last step ends, its target holds indefinitely.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SummitError};

/// One step of a habit ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampStep {
    /// How many weeks this step lasts (>= 1).
    pub weeks: u32,
    /// Weekly target during this step.
    pub target: f64,
}

impl RampStep {
    /// Create a new ramp step.
    pub fn new(weeks: u32, target: f64) -> Self {
        Self { weeks, target }
    }
}

/// Validated sequence of ramp steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RampStep>", into = "Vec<RampStep>")]
pub struct HabitRamp {
    steps: Vec<RampStep>,
}

impl HabitRamp {
    /// Build a ramp, rejecting empty, zero-length, or decreasing steps.
    pub fn new(steps: Vec<RampStep>) -> Result<Self> {
        if steps.is_empty() {
            return Err(SummitError::invalid_config("habit ramp has no steps"));
        }

        let mut previous = f64::NEG_INFINITY;
        for (i, step) in steps.iter().enumerate() {
            if step.weeks == 0 {
                return Err(SummitError::invalid_config(format!(
                    "ramp step {} lasts zero weeks",
                    i
                )));
            }
            if !step.target.is_finite() || step.target < 0.0 {
                return Err(SummitError::invalid_config(format!(
                    "ramp step {} has invalid target {}",
                    i, step.target
                )));
            }
            if step.target < previous {
                return Err(SummitError::invalid_config(format!(
                    "ramp step {} target {} is below the previous step's {}",
                    i, step.target, previous
                )));
            }
            previous = step.target;
        }

        Ok(Self { steps })
    }

    /// The ramp's steps in order.
    pub fn steps(&self) -> &[RampStep] {
        &self.steps
    }

    /// Total number of weeks before the ramp reaches its final step's end.
    pub fn total_weeks(&self) -> u32 {
        self.steps.iter().map(|s| s.weeks).sum()
    }

    /// Final weekly target.
    pub fn final_target(&self) -> f64 {
        // Non-empty by construction.
        self.steps.last().map(|s| s.target).unwrap_or_default()
    }

    /// Weekly target for a zero-based week index since the goal started.
    pub fn target_for_week(&self, week_index: u32) -> f64 {
        let mut elapsed = 0u32;
        for step in &self.steps {
            elapsed = elapsed.saturating_add(step.weeks);
            if week_index < elapsed {
                return step.target;
            }
        }
        self.final_target()
    }
}

impl TryFrom<Vec<RampStep>> for HabitRamp {
    type Error = SummitError;

    fn try_from(steps: Vec<RampStep>) -> Result<Self> {
        Self::new(steps)
    }
}

impl From<HabitRamp> for Vec<RampStep> {
    fn from(ramp: HabitRamp) -> Self {
        ramp.steps
    }
}
