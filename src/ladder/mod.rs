//! Milestone ladders and habit ramps.
//!
//! This module turns a start value, a target, and a growth curve into the
//! intermediate targets a goal is tracked against week by week.

pub mod curve;
pub mod generator;
pub mod ramp;

pub use curve::{ControlPoint, CurveShape};
pub use generator::{
    generate_ladder, Granularity, MAX_RUNGS, MilestoneLadder, MilestoneLadderConfig, RungCount,
};
pub use ramp::{HabitRamp, RampStep};
