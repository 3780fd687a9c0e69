//! Phase weight profiles and status thresholds.
//!
//! Weights never enter the composite product. They only decide whether a
//! low term is a bottleneck or expected in the current phase, and which
//! term is emphasized in the display.

use serde::{Deserialize, Serialize};

use crate::diagnostic::TermKind;
use crate::error::{Result, SummitError};
use crate::phase::GoalPhase;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Importance of each term in one phase. Weights sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub input_rate: f64,
    pub skill_leverage: f64,
    pub recovery: f64,
}

impl WeightProfile {
    pub fn new(input_rate: f64, skill_leverage: f64, recovery: f64) -> Self {
        Self {
            input_rate,
            skill_leverage,
            recovery,
        }
    }

    /// Weight of one term.
    pub fn weight(&self, kind: TermKind) -> f64 {
        match kind {
            TermKind::InputRate => self.input_rate,
            TermKind::SkillLeverage => self.skill_leverage,
            TermKind::Recovery => self.recovery,
        }
    }

    /// Each weight in [0, 1], summing to 1.
    pub fn validate(&self) -> Result<()> {
        let mut sum = 0.0;
        for kind in TermKind::ALL {
            let weight = self.weight(kind);
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(SummitError::invalid_config(format!(
                    "weight for {} is {}, expected 0 <= weight <= 1",
                    kind, weight
                )));
            }
            sum += weight;
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SummitError::invalid_config(format!(
                "term weights sum to {}, expected 1",
                sum
            )));
        }
        Ok(())
    }

    /// Term with the largest weight. Ties go to the earlier term.
    pub fn heaviest(&self) -> TermKind {
        let mut best = TermKind::InputRate;
        for kind in TermKind::ALL {
            if self.weight(kind) > self.weight(best) {
                best = kind;
            }
        }
        best
    }
}

/// One weight profile per phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseWeightProfiles {
    /// Favors input rate.
    pub acquisition: WeightProfile,
    /// Favors skill leverage.
    pub consolidation: WeightProfile,
    /// Favors recovery.
    pub graduated: WeightProfile,
}

impl Default for PhaseWeightProfiles {
    fn default() -> Self {
        Self {
            acquisition: WeightProfile::new(0.5, 0.2, 0.3),
            consolidation: WeightProfile::new(0.3, 0.5, 0.2),
            graduated: WeightProfile::new(0.2, 0.3, 0.5),
        }
    }
}

impl PhaseWeightProfiles {
    /// Profile for `phase`.
    pub fn for_phase(&self, phase: GoalPhase) -> &WeightProfile {
        match phase {
            GoalPhase::Acquisition => &self.acquisition,
            GoalPhase::Consolidation => &self.consolidation,
            GoalPhase::Graduated => &self.graduated,
        }
    }

    /// Validate all three profiles.
    pub fn validate(&self) -> Result<()> {
        for phase in GoalPhase::ALL {
            self.for_phase(phase).validate().map_err(|e| {
                SummitError::invalid_config(format!("{} weights: {}", phase, e))
            })?;
        }
        Ok(())
    }
}

/// Cutoffs for term status classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusThresholds {
    /// Values below this are low.
    pub low: f64,
    /// Values below this (but not low) earn a warning.
    pub moderate: f64,
    /// Low terms weighted at least this much are bottlenecks.
    pub high_weight: f64,
    /// Low terms weighted below this are expected.
    pub neutral_weight: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            low: 0.5,
            moderate: 0.7,
            high_weight: 0.4,
            neutral_weight: 0.34,
        }
    }
}

impl StatusThresholds {
    pub fn validate(&self) -> Result<()> {
        let values = [self.low, self.moderate, self.high_weight, self.neutral_weight];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SummitError::invalid_config(
                "status thresholds must be finite",
            ));
        }
        if !(self.low > 0.0 && self.low <= self.moderate && self.moderate <= 1.0) {
            return Err(SummitError::invalid_config(format!(
                "status thresholds need 0 < low <= moderate <= 1, got low {} moderate {}",
                self.low, self.moderate
            )));
        }
        if !(0.0..=1.0).contains(&self.neutral_weight)
            || !(0.0..=1.0).contains(&self.high_weight)
            || self.neutral_weight > self.high_weight
        {
            return Err(SummitError::invalid_config(format!(
                "weight thresholds need 0 <= neutral_weight <= high_weight <= 1, got {} and {}",
                self.neutral_weight, self.high_weight
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_are_valid() {
        assert!(PhaseWeightProfiles::default().validate().is_ok());
        assert!(StatusThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_each_phase_favors_its_term() {
        let profiles = PhaseWeightProfiles::default();
        assert_eq!(
            profiles.for_phase(GoalPhase::Acquisition).heaviest(),
            TermKind::InputRate
        );
        assert_eq!(
            profiles.for_phase(GoalPhase::Consolidation).heaviest(),
            TermKind::SkillLeverage
        );
        assert_eq!(
            profiles.for_phase(GoalPhase::Graduated).heaviest(),
            TermKind::Recovery
        );
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let result = WeightProfile::new(0.5, 0.5, 0.5).validate();
        assert!(matches!(result, Err(SummitError::InvalidConfig { .. })));
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert!(WeightProfile::new(1.2, -0.1, -0.1).validate().is_err());
    }

    #[test]
    fn test_invalid_profile_names_phase() {
        let mut profiles = PhaseWeightProfiles::default();
        profiles.consolidation = WeightProfile::new(0.9, 0.9, 0.9);
        let err = profiles.validate().unwrap_err();
        assert!(err.to_string().contains("consolidation"));
    }

    #[test]
    fn test_thresholds_must_be_ordered() {
        let mut thresholds = StatusThresholds::default();
        thresholds.low = 0.8;
        assert!(thresholds.validate().is_err());

        let mut thresholds = StatusThresholds::default();
        thresholds.neutral_weight = 0.6;
        assert!(thresholds.validate().is_err());

        let mut thresholds = StatusThresholds::default();
        thresholds.low = 0.0;
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_heaviest_tie_goes_to_earlier_term() {
        let profile = WeightProfile::new(0.4, 0.4, 0.2);
        assert_eq!(profile.heaviest(), TermKind::InputRate);
    }
}
