//! Weekly completion snapshots.
//!
//! One immutable record per goal per calendar week, written at week
//! rollover by the caller. [`SnapshotHistory`] is the validated, ordered
//! form the classifier consumes.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SummitError};

/// Completion record for one goal and one week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklySnapshot {
    /// First day of the week.
    pub week_start: NaiveDate,
    /// Target from the active ladder rung or ramp step.
    pub target_for_week: f64,
    /// What was actually completed.
    pub actual_for_week: f64,
}

impl WeeklySnapshot {
    /// Create a snapshot.
    pub fn new(week_start: NaiveDate, target_for_week: f64, actual_for_week: f64) -> Self {
        Self {
            week_start,
            target_for_week,
            actual_for_week,
        }
    }

    /// `actual / target`, or 0 when the target is 0.
    pub fn on_pace_ratio(&self) -> f64 {
        if self.target_for_week <= 0.0 {
            0.0
        } else {
            self.actual_for_week / self.target_for_week
        }
    }

    fn validate(&self) -> Result<()> {
        let values_ok = self.target_for_week.is_finite()
            && self.actual_for_week.is_finite()
            && self.target_for_week >= 0.0
            && self.actual_for_week >= 0.0;
        if !values_ok {
            return Err(SummitError::invalid_history(format!(
                "week {} has invalid values (target {}, actual {})",
                self.week_start, self.target_for_week, self.actual_for_week
            )));
        }
        Ok(())
    }
}

/// Ordered, validated snapshot history for one goal.
///
/// Week starts must be strictly increasing and at least seven days apart.
/// Larger gaps are allowed (missed rollovers) but break consecutive runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WeeklySnapshot>", into = "Vec<WeeklySnapshot>")]
pub struct SnapshotHistory {
    snapshots: Vec<WeeklySnapshot>,
}

impl SnapshotHistory {
    /// Validate and wrap a history. Never reorders or drops records.
    pub fn new(snapshots: Vec<WeeklySnapshot>) -> Result<Self> {
        Self::validate(&snapshots)?;
        Ok(Self { snapshots })
    }

    /// Check ordering, duplication, and value rules.
    pub fn validate(snapshots: &[WeeklySnapshot]) -> Result<()> {
        for snapshot in snapshots {
            snapshot.validate()?;
        }

        for pair in snapshots.windows(2) {
            let (prev, next) = (pair[0].week_start, pair[1].week_start);
            if next == prev {
                return Err(SummitError::invalid_history(format!(
                    "duplicate week {}",
                    next
                )));
            }
            if next < prev {
                return Err(SummitError::invalid_history(format!(
                    "week {} comes after {}",
                    next, prev
                )));
            }
            if next - prev < Duration::days(7) {
                return Err(SummitError::invalid_history(format!(
                    "weeks {} and {} are less than seven days apart",
                    prev, next
                )));
            }
        }

        Ok(())
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[WeeklySnapshot] {
        &self.snapshots
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether there are no snapshots.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Week start of the newest snapshot.
    pub fn latest_week(&self) -> Option<NaiveDate> {
        self.snapshots.last().map(|s| s.week_start)
    }

    /// The newest `n` snapshots, if at least `n` exist and they form an
    /// unbroken run of consecutive weeks.
    pub fn trailing_run(&self, n: usize) -> Option<&[WeeklySnapshot]> {
        if n == 0 || self.snapshots.len() < n {
            return None;
        }
        let window = &self.snapshots[self.snapshots.len() - n..];
        let consecutive = window
            .windows(2)
            .all(|pair| pair[1].week_start - pair[0].week_start == Duration::days(7));
        consecutive.then_some(window)
    }
}

impl TryFrom<Vec<WeeklySnapshot>> for SnapshotHistory {
    type Error = SummitError;

    fn try_from(snapshots: Vec<WeeklySnapshot>) -> Result<Self> {
        Self::new(snapshots)
    }
}

impl From<SnapshotHistory> for Vec<WeeklySnapshot> {
    fn from(history: SnapshotHistory) -> Self {
        history.snapshots
    }
}
