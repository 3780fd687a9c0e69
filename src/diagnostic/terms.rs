//! Diagnostic term values and status tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SummitError};
use crate::goal::progress_ratio;

/// One of the three diagnostic terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// Actual activity against target activity for the period.
    InputRate,
    /// How effectively effort turns into results.
    SkillLeverage,
    /// Rest and recovery capacity.
    Recovery,
}

impl TermKind {
    /// All terms in display order.
    pub const ALL: [TermKind; 3] = [Self::InputRate, Self::SkillLeverage, Self::Recovery];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputRate => "input_rate",
            Self::SkillLeverage => "skill_leverage",
            Self::Recovery => "recovery",
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TermKind {
    type Err = SummitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "input_rate" | "inputrate" => Ok(Self::InputRate),
            "skill_leverage" | "skillleverage" => Ok(Self::SkillLeverage),
            "recovery" => Ok(Self::Recovery),
            other => Err(SummitError::invalid_config(format!(
                "unknown diagnostic term '{}'",
                other
            ))),
        }
    }
}

/// Status tag shown next to a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermStatus {
    Strong,
    Warning,
    /// Low and currently important.
    Bottleneck,
    /// Low but not a priority in this phase.
    ExpectedLow,
}

impl TermStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Warning => "warning",
            Self::Bottleneck => "bottleneck",
            Self::ExpectedLow => "expected-low",
        }
    }
}

impl fmt::Display for TermStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw term values for one domain, each expected in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticTerms {
    pub input_rate: f64,
    pub skill_leverage: f64,
    pub recovery: f64,
}

impl DiagnosticTerms {
    /// Create a term set.
    pub fn new(input_rate: f64, skill_leverage: f64, recovery: f64) -> Self {
        Self {
            input_rate,
            skill_leverage,
            recovery,
        }
    }

    /// Value of one term.
    pub fn value(&self, kind: TermKind) -> f64 {
        match kind {
            TermKind::InputRate => self.input_rate,
            TermKind::SkillLeverage => self.skill_leverage,
            TermKind::Recovery => self.recovery,
        }
    }

    /// Fail if any term is non-finite or outside [0, 1].
    ///
    /// Terms are clamped where they are built. A value out of range here
    /// means the producer skipped that step, so it is not clamped again.
    pub fn check(&self) -> Result<()> {
        for kind in TermKind::ALL {
            let value = self.value(kind);
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SummitError::invariant(format!(
                    "diagnostic term {} = {} is outside [0, 1]",
                    kind, value
                )));
            }
        }
        Ok(())
    }
}

/// Build a term from a domain metric: `actual / target` clamped to [0, 1].
///
/// A non-positive target yields 0.
pub fn clamp_ratio(actual: f64, target: f64) -> Result<f64> {
    progress_ratio(actual, target)
}
