//! Phase lifecycle classifier.
//!
//! Transition rules, evaluated against the trailing snapshot window:
//! - acquisition → consolidation: 4 consecutive weeks with ratio >= 1.0
//! - consolidation → graduated: 8 consecutive weeks with ratio >= 1.0
//! - regression (one level down): 2 consecutive weeks with ratio < 0.5
//!
//! At most one transition is applied per evaluation. The result depends only
//! on the current phase and the history, so repeated evaluation of the same
//! inputs always yields the same phase.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SummitError};
use crate::phase::{SnapshotHistory, WeeklySnapshot};

/// Ratio at or above which a week counts as on pace.
pub const ON_PACE_RATIO: f64 = 1.0;

/// Ratio strictly below which a week counts toward regression.
pub const REGRESSION_RATIO: f64 = 0.5;

/// On-pace weeks needed to leave acquisition.
pub const CONSOLIDATION_WINDOW: usize = 4;

/// On-pace weeks needed to graduate.
pub const GRADUATION_WINDOW: usize = 8;

/// Weak weeks that trigger a one-level regression.
pub const REGRESSION_WINDOW: usize = 2;

/// Lifecycle phase of a goal instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GoalPhase {
    /// Early learning; the initial phase.
    #[default]
    Acquisition,
    /// Stabilizing.
    Consolidation,
    /// Mastered, in maintenance.
    Graduated,
}

impl GoalPhase {
    /// All phases, lowest first.
    pub const ALL: [GoalPhase; 3] = [
        GoalPhase::Acquisition,
        GoalPhase::Consolidation,
        GoalPhase::Graduated,
    ];

    /// The next phase up, if any.
    pub fn promoted(self) -> Option<GoalPhase> {
        match self {
            Self::Acquisition => Some(Self::Consolidation),
            Self::Consolidation => Some(Self::Graduated),
            Self::Graduated => None,
        }
    }

    /// The next phase down, if any.
    pub fn demoted(self) -> Option<GoalPhase> {
        match self {
            Self::Acquisition => None,
            Self::Consolidation => Some(Self::Acquisition),
            Self::Graduated => Some(Self::Consolidation),
        }
    }

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acquisition => "acquisition",
            Self::Consolidation => "consolidation",
            Self::Graduated => "graduated",
        }
    }

    /// On-pace window needed to promote out of this phase.
    fn promotion_window(self) -> Option<usize> {
        match self {
            Self::Acquisition => Some(CONSOLIDATION_WINDOW),
            Self::Consolidation => Some(GRADUATION_WINDOW),
            Self::Graduated => None,
        }
    }
}

impl fmt::Display for GoalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalPhase {
    type Err = SummitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "acquisition" => Ok(Self::Acquisition),
            "consolidation" => Ok(Self::Consolidation),
            "graduated" | "maintenance" => Ok(Self::Graduated),
            other => Err(SummitError::invalid_config(format!(
                "unknown phase '{}', expected acquisition, consolidation or graduated",
                other
            ))),
        }
    }
}

/// Why a transition fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// Trailing window entirely on pace.
    OnPaceStreak { weeks: usize },
    /// Trailing window entirely below the regression ratio.
    WeakStreak { weeks: usize },
}

/// A single applied phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: GoalPhase,
    pub to: GoalPhase,
    pub reason: TransitionReason,
}

impl PhaseTransition {
    /// Whether this moved the goal up a level.
    pub fn is_promotion(&self) -> bool {
        self.to > self.from
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Resulting phase.
    pub phase: GoalPhase,
    /// The transition applied, if any.
    pub transition: Option<PhaseTransition>,
}

impl Classification {
    fn unchanged(phase: GoalPhase) -> Self {
        Self {
            phase,
            transition: None,
        }
    }

    fn moved(from: GoalPhase, to: GoalPhase, reason: TransitionReason) -> Self {
        Self {
            phase: to,
            transition: Some(PhaseTransition { from, to, reason }),
        }
    }
}

fn all_on_pace(window: &[WeeklySnapshot]) -> bool {
    window.iter().all(|s| s.on_pace_ratio() >= ON_PACE_RATIO)
}

fn all_weak(window: &[WeeklySnapshot]) -> bool {
    window.iter().all(|s| s.on_pace_ratio() < REGRESSION_RATIO)
}

/// Evaluate one step of the state machine against a validated history.
pub fn evaluate(current: GoalPhase, history: &SnapshotHistory) -> Classification {
    if let Some(lower) = current.demoted() {
        if history.trailing_run(REGRESSION_WINDOW).is_some_and(all_weak) {
            return Classification::moved(
                current,
                lower,
                TransitionReason::WeakStreak {
                    weeks: REGRESSION_WINDOW,
                },
            );
        }
    }

    if let (Some(higher), Some(window)) = (current.promoted(), current.promotion_window()) {
        if history.trailing_run(window).is_some_and(all_on_pace) {
            return Classification::moved(
                current,
                higher,
                TransitionReason::OnPaceStreak { weeks: window },
            );
        }
    }

    Classification::unchanged(current)
}

/// Classify a goal's phase from its snapshot history.
///
/// Rejects malformed histories with `InvalidHistory` rather than guessing.
/// The caller persists the returned phase; see [`PhaseEngine`] for the
/// read-classify-write cycle.
///
/// [`PhaseEngine`]: crate::phase::PhaseEngine
pub fn classify_phase(
    goal_id: &str,
    current: GoalPhase,
    snapshots: &[WeeklySnapshot],
) -> Result<GoalPhase> {
    let history = SnapshotHistory::new(snapshots.to_vec()).map_err(|e| match e {
        SummitError::InvalidHistory { message } => {
            SummitError::invalid_history(format!("goal {}: {}", goal_id, message))
        }
        other => other,
    })?;
    let result = evaluate(current, &history);

    if let Some(transition) = result.transition {
        tracing::debug!(
            goal_id,
            from = %transition.from,
            to = %transition.to,
            "phase transition"
        );
    }

    Ok(result.phase)
}

/// A view-layer phase computation that must never be persisted.
///
/// Deliberately has no conversion into stored phase state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhasePreview {
    /// Phase the goal would have after evaluating the history.
    pub phase: GoalPhase,
    /// Newest week the preview is based on.
    pub based_on_week: Option<NaiveDate>,
}

/// Compute a preview phase for display.
pub fn preview_phase(current: GoalPhase, snapshots: &[WeeklySnapshot]) -> Result<PhasePreview> {
    let history = SnapshotHistory::new(snapshots.to_vec())?;
    Ok(PhasePreview {
        phase: evaluate(current, &history).phase,
        based_on_week: history.latest_week(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn history(ratios: &[f64]) -> Vec<WeeklySnapshot> {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        ratios
            .iter()
            .enumerate()
            .map(|(i, &r)| WeeklySnapshot::new(start + Duration::weeks(i as i64), 10.0, r * 10.0))
            .collect()
    }

    fn classify(current: GoalPhase, ratios: &[f64]) -> GoalPhase {
        classify_phase("goal", current, &history(ratios)).unwrap()
    }

    #[test]
    fn test_no_snapshots_stays_acquisition() {
        assert_eq!(classify(GoalPhase::Acquisition, &[]), GoalPhase::Acquisition);
    }

    #[test]
    fn test_four_on_pace_weeks_promote() {
        assert_eq!(
            classify(GoalPhase::Acquisition, &[1.1, 1.0, 1.05, 1.2]),
            GoalPhase::Consolidation
        );
    }

    #[test]
    fn test_three_on_pace_weeks_do_not_promote() {
        assert_eq!(
            classify(GoalPhase::Acquisition, &[0.2, 1.1, 1.0, 1.05]),
            GoalPhase::Acquisition
        );
    }

    #[test]
    fn test_ratio_exactly_one_is_on_pace() {
        assert_eq!(
            classify(GoalPhase::Acquisition, &[1.0, 1.0, 1.0, 1.0]),
            GoalPhase::Consolidation
        );
    }

    #[test]
    fn test_two_weak_weeks_regress_consolidation() {
        assert_eq!(
            classify(GoalPhase::Consolidation, &[0.4, 0.3]),
            GoalPhase::Acquisition
        );
    }

    #[test]
    fn test_ratio_exactly_half_is_not_weak() {
        assert_eq!(
            classify(GoalPhase::Consolidation, &[0.5, 0.3]),
            GoalPhase::Consolidation
        );
        assert_eq!(
            classify(GoalPhase::Consolidation, &[0.3, 0.5]),
            GoalPhase::Consolidation
        );
    }

    #[test]
    fn test_graduated_regresses_one_level_only() {
        assert_eq!(
            classify(GoalPhase::Graduated, &[0.0, 0.0, 0.0, 0.0]),
            GoalPhase::Consolidation
        );
    }

    #[test]
    fn test_acquisition_cannot_regress() {
        assert_eq!(
            classify(GoalPhase::Acquisition, &[0.1, 0.1]),
            GoalPhase::Acquisition
        );
    }

    #[test]
    fn test_eight_on_pace_weeks_graduate() {
        let ratios = [1.0; 8];
        assert_eq!(classify(GoalPhase::Consolidation, &ratios), GoalPhase::Graduated);
        assert_eq!(
            classify(GoalPhase::Consolidation, &ratios[..7]),
            GoalPhase::Consolidation
        );
    }

    #[test]
    fn test_eight_weeks_from_acquisition_moves_one_level() {
        assert_eq!(
            classify(GoalPhase::Acquisition, &[1.0; 8]),
            GoalPhase::Consolidation
        );
    }

    #[test]
    fn test_graduated_stays_on_pace() {
        assert_eq!(classify(GoalPhase::Graduated, &[1.5; 10]), GoalPhase::Graduated);
    }

    #[test]
    fn test_gap_breaks_streak() {
        let mut snapshots = history(&[1.0, 1.0, 1.0]);
        let last = snapshots.last().unwrap().week_start;
        snapshots.push(WeeklySnapshot::new(last + Duration::weeks(2), 10.0, 10.0));
        assert_eq!(
            classify_phase("goal", GoalPhase::Acquisition, &snapshots).unwrap(),
            GoalPhase::Acquisition
        );
    }

    #[test]
    fn test_zero_target_weeks_count_as_weak() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let snapshots = vec![
            WeeklySnapshot::new(start, 0.0, 5.0),
            WeeklySnapshot::new(start + Duration::weeks(1), 0.0, 5.0),
        ];
        assert_eq!(
            classify_phase("goal", GoalPhase::Consolidation, &snapshots).unwrap(),
            GoalPhase::Acquisition
        );
    }

    #[test]
    fn test_invalid_history_names_goal() {
        let mut snapshots = history(&[1.0, 1.0]);
        snapshots.swap(0, 1);
        let err = classify_phase("goal-42", GoalPhase::Acquisition, &snapshots).unwrap_err();
        assert!(matches!(err, SummitError::InvalidHistory { .. }));
        assert!(err.to_string().contains("goal-42"));
    }

    #[test]
    fn test_evaluate_reports_transition() {
        let h = SnapshotHistory::new(history(&[0.1, 0.2])).unwrap();
        let result = evaluate(GoalPhase::Graduated, &h);
        let transition = result.transition.unwrap();
        assert_eq!(transition.from, GoalPhase::Graduated);
        assert_eq!(transition.to, GoalPhase::Consolidation);
        assert!(!transition.is_promotion());
        assert_eq!(
            transition.reason,
            TransitionReason::WeakStreak {
                weeks: REGRESSION_WINDOW
            }
        );
    }

    #[test]
    fn test_preview_does_not_need_store() {
        let preview = preview_phase(GoalPhase::Acquisition, &history(&[1.0; 4])).unwrap();
        assert_eq!(preview.phase, GoalPhase::Consolidation);
        assert!(preview.based_on_week.is_some());
    }

    #[test]
    fn test_phase_parsing() {
        assert_eq!("Acquisition".parse::<GoalPhase>().unwrap(), GoalPhase::Acquisition);
        assert_eq!("maintenance".parse::<GoalPhase>().unwrap(), GoalPhase::Graduated);
        assert!("mastered".parse::<GoalPhase>().is_err());
    }

    fn phase_strategy() -> impl Strategy<Value = GoalPhase> {
        prop_oneof![
            Just(GoalPhase::Acquisition),
            Just(GoalPhase::Consolidation),
            Just(GoalPhase::Graduated),
        ]
    }

    proptest! {
        #[test]
        fn prop_at_most_one_level_per_call(
            current in phase_strategy(),
            ratios in proptest::collection::vec(0.0f64..2.0, 0..20),
        ) {
            let next = classify(current, &ratios);
            let distance = (next as i32 - current as i32).abs();
            prop_assert!(distance <= 1);
        }

        #[test]
        fn prop_classification_is_idempotent(
            current in phase_strategy(),
            ratios in proptest::collection::vec(0.0f64..2.0, 0..20),
        ) {
            let first = classify(current, &ratios);
            let second = classify(current, &ratios);
            prop_assert_eq!(first, second);
        }
    }
}
