//! The phase-gated diagnostic formula.
//!
//! composite = input_rate × skill_leverage × recovery
//!
//! The product is unweighted, so any zero term forces the composite to zero.
//! Phase weights decide each term's status tag.

use serde::{Deserialize, Serialize};

use crate::diagnostic::{
    DiagnosticTerms, PhaseWeightProfiles, StatusThresholds, TermKind, TermStatus,
};
use crate::error::{Result, SummitError};
use crate::phase::GoalPhase;

/// One classified term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermScore {
    pub kind: TermKind,
    pub value: f64,
    /// Phase weight applied to this term.
    pub weight: f64,
    pub status: TermStatus,
}

/// Diagnostic result for one domain at one instant. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticScore {
    pub phase: GoalPhase,
    pub input_rate: TermScore,
    pub skill_leverage: TermScore,
    pub recovery: TermScore,
    pub composite: f64,
}

impl DiagnosticScore {
    /// Terms in display order.
    pub fn terms(&self) -> [&TermScore; 3] {
        [&self.input_rate, &self.skill_leverage, &self.recovery]
    }

    /// Score for one term.
    pub fn term(&self, kind: TermKind) -> &TermScore {
        match kind {
            TermKind::InputRate => &self.input_rate,
            TermKind::SkillLeverage => &self.skill_leverage,
            TermKind::Recovery => &self.recovery,
        }
    }

    /// Terms tagged as bottlenecks, for callouts.
    pub fn bottlenecks(&self) -> Vec<TermKind> {
        self.terms()
            .into_iter()
            .filter(|t| t.status == TermStatus::Bottleneck)
            .map(|t| t.kind)
            .collect()
    }

    /// The term this phase weights most heavily.
    pub fn primary_focus(&self) -> TermKind {
        let mut best = &self.input_rate;
        for term in self.terms() {
            if term.weight > best.weight {
                best = term;
            }
        }
        best.kind
    }
}

/// Tag a term from its value and phase weight.
pub fn classify_term(value: f64, weight: f64, thresholds: &StatusThresholds) -> TermStatus {
    if value < thresholds.low {
        if weight >= thresholds.high_weight {
            return TermStatus::Bottleneck;
        }
        if weight < thresholds.neutral_weight {
            return TermStatus::ExpectedLow;
        }
    }
    if value < thresholds.moderate {
        TermStatus::Warning
    } else {
        TermStatus::Strong
    }
}

/// Score three terms for a goal in `phase`.
pub fn compute_diagnostic(
    terms: &DiagnosticTerms,
    phase: GoalPhase,
    profiles: &PhaseWeightProfiles,
    thresholds: &StatusThresholds,
) -> Result<DiagnosticScore> {
    terms.check()?;
    profiles.validate()?;
    thresholds.validate()?;

    let profile = profiles.for_phase(phase);
    let score = |kind: TermKind| {
        let value = terms.value(kind);
        let weight = profile.weight(kind);
        TermScore {
            kind,
            value,
            weight,
            status: classify_term(value, weight, thresholds),
        }
    };

    let composite = terms.input_rate * terms.skill_leverage * terms.recovery;
    if !(0.0..=1.0).contains(&composite) {
        return Err(SummitError::invariant(format!(
            "composite {} escaped [0, 1]",
            composite
        )));
    }

    let result = DiagnosticScore {
        phase,
        input_rate: score(TermKind::InputRate),
        skill_leverage: score(TermKind::SkillLeverage),
        recovery: score(TermKind::Recovery),
        composite,
    };

    tracing::debug!(
        phase = %phase,
        composite,
        bottlenecks = result.bottlenecks().len(),
        "computed diagnostic"
    );

    Ok(result)
}
