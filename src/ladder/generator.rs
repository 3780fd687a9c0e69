//! Milestone ladder generation.
//!
//! Ladder logic:
//! 1. Reject non-finite values and targets below the start
//! 2. A target equal to the start is a single-rung ladder
//! 3. Interpolate `n` rungs along the curve, rounding to the goal's granularity
//! 4. Clamp every rung to `[previous rung, target]`; the last rung is the target
//!
//! Generation is a pure function of the config. The UI and the badge engine
//! both call it and must agree on rung counts.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SummitError};
use crate::ladder::CurveShape;

/// Largest rung count a ladder may resolve to.
///
/// A weekly rung for twenty years fits comfortably.
pub const MAX_RUNGS: u32 = 1_040;

/// How many rungs a ladder has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RungCount {
    /// A fixed number of rungs.
    Explicit(u32),
    /// One rung per `weeks_per_rung` weeks of the schedule, rounded up.
    Duration { weeks: u32, weeks_per_rung: u32 },
}

impl RungCount {
    /// Resolve to a concrete rung count in `1..=MAX_RUNGS`.
    pub fn resolve(&self) -> Result<u32> {
        let count = match *self {
            Self::Explicit(n) => n,
            Self::Duration {
                weeks,
                weeks_per_rung,
            } => {
                if weeks_per_rung == 0 {
                    return Err(SummitError::invalid_config(
                        "weeks_per_rung must be at least 1",
                    ));
                }
                weeks.div_ceil(weeks_per_rung)
            }
        };

        if count == 0 {
            return Err(SummitError::invalid_config("rung count must be at least 1"));
        }
        if count > MAX_RUNGS {
            return Err(SummitError::invalid_config(format!(
                "rung count {} exceeds the maximum of {}",
                count, MAX_RUNGS
            )));
        }
        Ok(count)
    }
}

impl Default for RungCount {
    fn default() -> Self {
        Self::Explicit(4)
    }
}

/// Numeric granularity of a goal's unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Whole units (count-based goals).
    #[default]
    Integer,
    /// Multiples of a positive step (e.g. 0.5 km).
    Step(f64),
}

impl Granularity {
    fn step(&self) -> f64 {
        match *self {
            Self::Integer => 1.0,
            Self::Step(step) => step,
        }
    }

    fn validate(&self) -> Result<()> {
        let step = self.step();
        if !step.is_finite() || step <= 0.0 {
            return Err(SummitError::invalid_config(format!(
                "granularity step must be a positive number, got {}",
                step
            )));
        }
        Ok(())
    }

    /// Round to the nearest multiple of the step.
    pub fn round(&self, value: f64) -> f64 {
        let step = self.step();
        (value / step).round() * step
    }
}

/// User-customized schedule definition for one goal instance.
///
/// Replaced wholesale on edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneLadderConfig {
    /// Value the goal starts from.
    pub start: f64,
    /// Final target value.
    pub target: f64,
    /// Interpolation rule.
    #[serde(default)]
    pub curve: CurveShape,
    /// Number of rungs.
    #[serde(default)]
    pub rungs: RungCount,
    /// Rounding unit for rungs.
    #[serde(default)]
    pub granularity: Granularity,
}

impl MilestoneLadderConfig {
    /// Create a config with integer granularity.
    pub fn new(start: f64, target: f64, curve: CurveShape, rungs: RungCount) -> Self {
        Self {
            start,
            target,
            curve,
            rungs,
            granularity: Granularity::Integer,
        }
    }

    /// Set the rounding granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Validate every field without generating rungs.
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.target.is_finite() {
            return Err(SummitError::invalid_config(format!(
                "start ({}) and target ({}) must be finite",
                self.start, self.target
            )));
        }
        if self.target < self.start {
            return Err(SummitError::invalid_config(format!(
                "target {} is below start {}",
                self.target, self.start
            )));
        }
        self.rungs.resolve()?;
        self.curve.validate()?;
        self.granularity.validate()
    }
}

/// Generate the ordered rungs for a ladder config.
pub fn generate_ladder(config: &MilestoneLadderConfig) -> Result<Vec<f64>> {
    config.validate()?;

    if config.target == config.start {
        return Ok(vec![config.target]);
    }

    let count = config.rungs.resolve()?;
    let span = config.target - config.start;
    let mut rungs = Vec::with_capacity(count as usize);
    let mut previous = config.start;

    for i in 1..=count {
        let rung = if i == count {
            config.target
        } else {
            let t = f64::from(i) / f64::from(count);
            let raw = config.start + span * config.curve.eval(t);
            config
                .granularity
                .round(raw)
                .clamp(previous, config.target)
        };
        rungs.push(rung);
        previous = rung;
    }

    tracing::debug!(
        curve = %config.curve,
        rungs = rungs.len(),
        "generated milestone ladder"
    );

    Ok(rungs)
}

/// A generated ladder with rung lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneLadder {
    /// Ordered, non-decreasing rung values.
    pub rungs: Vec<f64>,
}

impl MilestoneLadder {
    /// Generate a ladder from a config.
    pub fn generate(config: &MilestoneLadderConfig) -> Result<Self> {
        Ok(Self {
            rungs: generate_ladder(config)?,
        })
    }

    /// Number of rungs.
    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    /// Whether the ladder has no rungs (never true for generated ladders).
    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    /// Final target.
    pub fn target(&self) -> Option<f64> {
        self.rungs.last().copied()
    }

    /// Target for the given rung index, holding the final rung past the end.
    pub fn target_for_rung(&self, index: usize) -> Option<f64> {
        self.rungs
            .get(index)
            .or_else(|| self.rungs.last())
            .copied()
    }

    /// Number of rungs already reached by `current`.
    pub fn rungs_reached(&self, current: f64) -> usize {
        self.rungs.iter().take_while(|&&rung| current >= rung).count()
    }
}
