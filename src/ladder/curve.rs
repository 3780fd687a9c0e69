//! Growth curve shapes for milestone ladders.
//!
//! A curve maps normalized progress through the schedule `t ∈ [0, 1]` to the
//! normalized fraction of the distance from start to target. Every built-in
//! curve is monotone; custom curves may dip, and the generator clamps those
//! dips to the previous rung.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SummitError};

/// One user-supplied point on a custom curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Position in the schedule, strictly inside (0, 1).
    pub t: f64,
    /// Fraction of the start-to-target distance reached at `t`, in [0, 1].
    pub value: f64,
}

impl ControlPoint {
    /// Create a new control point.
    pub fn new(t: f64, value: f64) -> Self {
        Self { t, value }
    }
}

/// Interpolation rule for spacing ladder rungs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveShape {
    /// Evenly spaced rungs.
    #[default]
    Linear,
    /// Small early steps, large late steps (`t²`).
    EaseIn,
    /// Large early steps, small late steps (`1 - (1 - t)²`).
    EaseOut,
    /// Slow start and finish (smoothstep `3t² - 2t³`).
    EaseInOut,
    /// Piecewise-linear through `(0, 0)`, the control points, and `(1, 1)`.
    Custom { control_points: Vec<ControlPoint> },
}

impl CurveShape {
    /// Build a custom curve, rejecting malformed control points.
    pub fn custom(control_points: Vec<ControlPoint>) -> Result<Self> {
        let curve = Self::Custom { control_points };
        curve.validate()?;
        Ok(curve)
    }

    /// Check that a custom curve's control points are usable.
    ///
    /// Built-in curves are always valid. Custom points must be finite, have
    /// `t` strictly inside (0, 1) and strictly increasing, and have `value`
    /// in [0, 1].
    pub fn validate(&self) -> Result<()> {
        let Self::Custom { control_points } = self else {
            return Ok(());
        };

        let mut last_t = 0.0f64;
        for (i, point) in control_points.iter().enumerate() {
            if !point.t.is_finite() || !point.value.is_finite() {
                return Err(SummitError::invalid_config(format!(
                    "control point {} is not finite",
                    i
                )));
            }
            if point.t <= 0.0 || point.t >= 1.0 {
                return Err(SummitError::invalid_config(format!(
                    "control point {} has t = {}, expected 0 < t < 1",
                    i, point.t
                )));
            }
            if point.t <= last_t {
                return Err(SummitError::invalid_config(format!(
                    "control point {} has t = {}, which does not follow t = {}",
                    i, point.t, last_t
                )));
            }
            if !(0.0..=1.0).contains(&point.value) {
                return Err(SummitError::invalid_config(format!(
                    "control point {} has value = {}, expected 0 <= value <= 1",
                    i, point.value
                )));
            }
            last_t = point.t;
        }

        Ok(())
    }

    /// Evaluate the curve at `t`, clamped to [0, 1].
    pub fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
            Self::Custom { control_points } => eval_piecewise(control_points, t),
        }
    }

    /// Stable identifier used in CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
            Self::Custom { .. } => "custom",
        }
    }
}

fn eval_piecewise(points: &[ControlPoint], t: f64) -> f64 {
    let mut prev = ControlPoint::new(0.0, 0.0);
    for point in points.iter().copied().chain(std::iter::once(ControlPoint::new(1.0, 1.0))) {
        if t <= point.t {
            let span = point.t - prev.t;
            if span <= 0.0 {
                return point.value;
            }
            let frac = (t - prev.t) / span;
            return prev.value + (point.value - prev.value) * frac;
        }
        prev = point;
    }
    1.0
}

impl fmt::Display for CurveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveShape {
    type Err = SummitError;

    /// Parse a built-in curve name. Custom curves need control points and
    /// can only come from structured config.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "linear" => Ok(Self::Linear),
            "ease-in" => Ok(Self::EaseIn),
            "ease-out" => Ok(Self::EaseOut),
            "ease-in-out" => Ok(Self::EaseInOut),
            other => Err(SummitError::invalid_config(format!(
                "unknown curve '{}', expected linear, ease-in, ease-out or ease-in-out",
                other
            ))),
        }
    }
}
