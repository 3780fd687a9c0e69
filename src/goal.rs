//! Goal instance records.
//!
//! A goal instance is one user's copy of an L3 template, owned and persisted
//! by the surrounding application. The engine reads instances to compute
//! progress; it never writes them. Phase changes come from the phase engine.

use serde::{Deserialize, Serialize};

use crate::catalog::{GoalTemplate, TemplateType};
use crate::error::{Result, SummitError};
use crate::ladder::{HabitRamp, MilestoneLadder, MilestoneLadderConfig};
use crate::phase::GoalPhase;

/// Tracking period of a goal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    #[default]
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// One user's instance of an L3 template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalInstance {
    /// Instance id.
    pub id: String,
    /// L3 template this instance was created from.
    pub template_id: String,
    /// Customized ladder (milestone goals).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ladder: Option<MilestoneLadderConfig>,
    /// Customized ramp (habit goals).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp: Option<HabitRamp>,
    /// Current value toward the target.
    pub current_value: f64,
    /// Final target value.
    pub target_value: f64,
    /// Tracking period.
    #[serde(default)]
    pub period: GoalPeriod,
    /// Phase as last persisted by the phase engine.
    #[serde(default)]
    pub phase: GoalPhase,
    /// Consecutive on-pace periods.
    #[serde(default)]
    pub streak: u32,
}

impl GoalInstance {
    /// Create an instance with explicit values and no schedule.
    pub fn new(
        id: impl Into<String>,
        template_id: impl Into<String>,
        current_value: f64,
        target_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            template_id: template_id.into(),
            ladder: None,
            ramp: None,
            current_value,
            target_value,
            period: GoalPeriod::Weekly,
            phase: GoalPhase::Acquisition,
            streak: 0,
        }
    }

    /// Create an instance from an L3 template's defaults.
    pub fn from_template(id: impl Into<String>, template: &GoalTemplate) -> Result<Self> {
        let instance = match template.template_type {
            Some(TemplateType::MilestoneLadder) => {
                let ladder = template.default_milestones.clone();
                let (start, target) = ladder
                    .as_ref()
                    .map(|c| (c.start, c.target))
                    .unwrap_or((0.0, 0.0));
                let mut instance = Self::new(id, &template.id, start, target);
                instance.ladder = ladder;
                instance
            }
            Some(TemplateType::HabitRamp) => {
                let ramp = template.default_ramp_steps.clone();
                let target = ramp.as_ref().map(|r| r.final_target()).unwrap_or(0.0);
                let mut instance = Self::new(id, &template.id, 0.0, target);
                instance.ramp = ramp;
                instance
            }
            None => {
                return Err(SummitError::invalid_config(format!(
                    "template '{}' is not a trackable goal",
                    template.id
                )))
            }
        };
        Ok(instance)
    }

    /// Replace the ladder config wholesale.
    pub fn with_ladder(mut self, config: MilestoneLadderConfig) -> Self {
        self.target_value = config.target;
        self.ladder = Some(config);
        self
    }

    /// Set the phase (as read from the phase store).
    pub fn with_phase(mut self, phase: GoalPhase) -> Self {
        self.phase = phase;
        self
    }

    /// `current / target`, clamped to [0, 1].
    ///
    /// A non-positive target yields 0. Non-finite values are an upstream
    /// data bug.
    pub fn progress_percentage(&self) -> Result<f64> {
        progress_ratio(self.current_value, self.target_value)
    }

    /// The generated ladder, if this is a milestone goal.
    pub fn milestone_ladder(&self) -> Result<Option<MilestoneLadder>> {
        self.ladder.as_ref().map(MilestoneLadder::generate).transpose()
    }

    /// First ladder rung not yet reached.
    pub fn next_milestone(&self) -> Result<Option<f64>> {
        Ok(self
            .milestone_ladder()?
            .and_then(|ladder| ladder.rungs.into_iter().find(|&r| r > self.current_value)))
    }

    /// Weekly target for habit goals at a zero-based week index.
    pub fn habit_target_for_week(&self, week_index: u32) -> Option<f64> {
        self.ramp.as_ref().map(|r| r.target_for_week(week_index))
    }
}

/// `current / target` clamped to [0, 1]; 0 for non-positive targets.
pub fn progress_ratio(current: f64, target: f64) -> Result<f64> {
    if !current.is_finite() || !target.is_finite() {
        return Err(SummitError::invariant(format!(
            "progress inputs must be finite (current {}, target {})",
            current, target
        )));
    }
    if target <= 0.0 {
        return Ok(0.0);
    }
    Ok((current / target).clamp(0.0, 1.0))
}
