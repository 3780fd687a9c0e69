//! Badge tiers and their progress thresholds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SummitError};

/// Badge tier, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl BadgeTier {
    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Diamond => "diamond",
        }
    }
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum aggregate progress for each tier.
///
/// Thresholds are supplied by configuration, possibly per badge category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub bronze: f64,
    pub silver: f64,
    pub gold: f64,
    pub diamond: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            bronze: 0.25,
            silver: 0.5,
            gold: 0.75,
            diamond: 1.0,
        }
    }
}

impl TierThresholds {
    /// Create thresholds (not yet validated).
    pub fn new(bronze: f64, silver: f64, gold: f64, diamond: f64) -> Self {
        Self {
            bronze,
            silver,
            gold,
            diamond,
        }
    }

    fn ascending(&self) -> [(BadgeTier, f64); 4] {
        [
            (BadgeTier::Bronze, self.bronze),
            (BadgeTier::Silver, self.silver),
            (BadgeTier::Gold, self.gold),
            (BadgeTier::Diamond, self.diamond),
        ]
    }

    /// Thresholds must be finite, in (0, 1], and strictly ascending.
    pub fn validate(&self) -> Result<()> {
        let mut previous = 0.0f64;
        for (tier, value) in self.ascending() {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(SummitError::invalid_config(format!(
                    "{} threshold {} must be in (0, 1]",
                    tier, value
                )));
            }
            if value <= previous {
                return Err(SummitError::invalid_config(format!(
                    "{} threshold {} must exceed the previous tier's {}",
                    tier, value, previous
                )));
            }
            previous = value;
        }
        Ok(())
    }

    /// Highest tier whose threshold `progress` reaches.
    pub fn tier_for(&self, progress: f64) -> BadgeTier {
        self.ascending()
            .iter()
            .rev()
            .find(|(_, threshold)| progress >= *threshold)
            .map(|(tier, _)| *tier)
            .unwrap_or(BadgeTier::None)
    }
}
