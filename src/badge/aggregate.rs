//! Badge aggregation.
//!
//! Aggregation logic:
//! 1. Each L3 child contributes its progress (clamped to [0, 1])
//! 2. Children in acquisition are down-weighted; consolidation and graduated
//!    children count in full
//! 3. Aggregate = Σ(weight × progress) / number of children
//! 4. The aggregate maps to a tier through ascending thresholds

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::badge::{BadgeTier, TierThresholds};
use crate::catalog::{GoalLevel, TemplateGraph};
use crate::error::{Result, SummitError};
use crate::goal::{progress_ratio, GoalInstance};
use crate::phase::GoalPhase;

/// Default contribution weight of a child still in acquisition.
pub const DEFAULT_ACQUISITION_WEIGHT: f64 = 0.5;

/// Per-phase contribution weights for badge aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseWeighting {
    /// Weight for acquisition-phase children, strictly between 0 and 1.
    pub acquisition: f64,
}

impl Default for PhaseWeighting {
    fn default() -> Self {
        Self {
            acquisition: DEFAULT_ACQUISITION_WEIGHT,
        }
    }
}

impl PhaseWeighting {
    /// Create a weighting with the given acquisition factor.
    pub fn new(acquisition: f64) -> Self {
        Self { acquisition }
    }

    /// The acquisition weight must be a reduction: 0 < w < 1.
    pub fn validate(&self) -> Result<()> {
        if !self.acquisition.is_finite() || self.acquisition <= 0.0 || self.acquisition >= 1.0 {
            return Err(SummitError::invalid_config(format!(
                "acquisition weight {} must be between 0 and 1 (exclusive)",
                self.acquisition
            )));
        }
        Ok(())
    }

    /// Weight for a child in `phase`.
    pub fn weight_for(&self, phase: GoalPhase) -> f64 {
        match phase {
            GoalPhase::Acquisition => self.acquisition,
            GoalPhase::Consolidation | GoalPhase::Graduated => 1.0,
        }
    }
}

/// One child goal's contribution input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildProgress {
    /// Child goal or template id.
    pub goal_id: String,
    /// Progress in [0, 1].
    pub progress: f64,
    /// Current persisted phase.
    pub phase: GoalPhase,
}

impl ChildProgress {
    /// Create a child contribution from an already-computed progress.
    pub fn new(goal_id: impl Into<String>, progress: f64, phase: GoalPhase) -> Self {
        Self {
            goal_id: goal_id.into(),
            progress,
            phase,
        }
    }

    /// Compute progress as `current / target`, clamped to [0, 1].
    pub fn from_values(
        goal_id: impl Into<String>,
        current: f64,
        target: f64,
        phase: GoalPhase,
    ) -> Result<Self> {
        Ok(Self::new(goal_id, progress_ratio(current, target)?, phase))
    }

    /// Contribution of a goal instance.
    pub fn from_instance(instance: &GoalInstance) -> Result<Self> {
        Ok(Self::new(
            &instance.id,
            instance.progress_percentage()?,
            instance.phase,
        ))
    }
}

/// Aggregate view of one L2 badge. Derived on demand, never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeStatus {
    /// L2 template id.
    pub badge_id: String,
    /// Tier reached.
    pub tier: BadgeTier,
    /// Weighted aggregate progress in [0, 1].
    pub progress: f64,
    /// True iff the tier is above none.
    pub unlocked: bool,
}

impl BadgeStatus {
    /// Status for a badge with no progress.
    pub fn locked(badge_id: impl Into<String>) -> Self {
        Self {
            badge_id: badge_id.into(),
            tier: BadgeTier::None,
            progress: 0.0,
            unlocked: false,
        }
    }
}

/// Compute a badge from its children's progress and phases.
pub fn compute_badge(
    l2_id: &str,
    children: &[ChildProgress],
    thresholds: &TierThresholds,
    weighting: &PhaseWeighting,
) -> Result<BadgeStatus> {
    thresholds.validate()?;
    weighting.validate()?;

    if children.is_empty() {
        return Ok(BadgeStatus::locked(l2_id));
    }

    let mut weighted = 0.0;
    for child in children {
        if !child.progress.is_finite() || !(0.0..=1.0).contains(&child.progress) {
            return Err(SummitError::invariant(format!(
                "child {} of {} has progress {} outside [0, 1]",
                child.goal_id, l2_id, child.progress
            )));
        }
        weighted += weighting.weight_for(child.phase) * child.progress;
    }

    let progress = weighted / children.len() as f64;
    if !(0.0..=1.0).contains(&progress) {
        return Err(SummitError::invariant(format!(
            "aggregate progress {} for {} escaped [0, 1]",
            progress, l2_id
        )));
    }

    let tier = thresholds.tier_for(progress);
    tracing::debug!(badge_id = l2_id, progress, tier = %tier, "computed badge");

    Ok(BadgeStatus {
        badge_id: l2_id.to_string(),
        tier,
        progress,
        unlocked: tier != BadgeTier::None,
    })
}

/// Compute a badge by looking up its L3 children in the catalog.
///
/// `instances` are the user's goal instances; at most one per child
/// template. Instances of templates outside this badge are ignored.
/// Children the user has not started count as zero progress in acquisition.
pub fn compute_badge_from_graph(
    graph: &TemplateGraph,
    l2_id: &str,
    instances: &[GoalInstance],
    thresholds: &TierThresholds,
    weighting: &PhaseWeighting,
) -> Result<BadgeStatus> {
    let badge = graph.get(l2_id)?;
    if badge.level != GoalLevel::Achievement {
        return Err(SummitError::invalid_config(format!(
            "'{}' is an {} template, badges are L2",
            l2_id, badge.level
        )));
    }

    let templates = graph.get_children(l2_id)?;
    let mut by_template: HashMap<&str, &GoalInstance> = HashMap::new();
    for instance in instances {
        let is_child = templates.iter().any(|t| t.id == instance.template_id);
        if !is_child {
            continue;
        }
        if by_template
            .insert(instance.template_id.as_str(), instance)
            .is_some()
        {
            return Err(SummitError::invalid_config(format!(
                "more than one goal instance for template '{}'",
                instance.template_id
            )));
        }
    }

    let children = templates
        .into_iter()
        .map(|template| match by_template.get(template.id.as_str()) {
            Some(instance) => ChildProgress::from_instance(instance),
            None => Ok(ChildProgress::new(&template.id, 0.0, GoalPhase::Acquisition)),
        })
        .collect::<Result<Vec<_>>>()?;

    compute_badge(l2_id, &children, thresholds, weighting)
}
