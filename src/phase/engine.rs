//! Read-classify-write cycle for persisted goal phases.
//!
//! Each call reads the stored state, evaluates the history, and writes the
//! result with a compare-and-swap on the state's version. Two concurrent
//! evaluations of the same goal cannot both apply a transition: the loser
//! gets `Conflict`, and on retry sees that the week was already evaluated.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, SummitError};
use crate::phase::{
    evaluate, GoalPhase, GoalPhaseState, PhaseTransition, SnapshotHistory, WeeklySnapshot,
};
use crate::storage::PhaseStore;

/// Result of recording a week for one goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseUpdate {
    /// Goal instance id.
    pub goal_id: String,
    /// Phase before this call.
    pub previous: GoalPhase,
    /// Phase after this call.
    pub phase: GoalPhase,
    /// Transition applied by this call, if any.
    pub transition: Option<PhaseTransition>,
    /// Stored version after this call.
    pub version: u64,
    /// Newest evaluated week after this call.
    pub evaluated_through: Option<NaiveDate>,
    /// Whether this call wrote to the store.
    pub persisted: bool,
}

impl PhaseUpdate {
    fn unchanged(state: &GoalPhaseState) -> Self {
        Self {
            goal_id: state.goal_id.clone(),
            previous: state.phase,
            phase: state.phase,
            transition: None,
            version: state.version,
            evaluated_through: state.evaluated_through,
            persisted: false,
        }
    }
}

/// Phase classifier bound to a phase store.
#[derive(Debug)]
pub struct PhaseEngine<S: PhaseStore> {
    store: S,
}

impl<S: PhaseStore> PhaseEngine<S> {
    /// Create an engine over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current stored state, or the initial state for an unknown goal.
    pub fn current(&self, goal_id: &str) -> Result<GoalPhaseState> {
        Ok(self
            .store
            .get(goal_id)?
            .unwrap_or_else(|| GoalPhaseState::new(goal_id)))
    }

    /// Evaluate the newest snapshot week and persist the result.
    ///
    /// Weeks already evaluated are not re-applied, so replaying a rollover
    /// leaves the stored phase untouched.
    pub fn record_week(&self, goal_id: &str, snapshots: &[WeeklySnapshot]) -> Result<PhaseUpdate> {
        let history = SnapshotHistory::new(snapshots.to_vec())?;
        let state = self.current(goal_id)?;

        let Some(latest) = history.latest_week() else {
            return Ok(PhaseUpdate::unchanged(&state));
        };

        if let Some(done) = state.evaluated_through {
            if latest < done {
                return Err(SummitError::invalid_history(format!(
                    "goal {}: newest week {} precedes already evaluated week {}",
                    goal_id, latest, done
                )));
            }
        }
        if state.has_evaluated(latest) {
            tracing::debug!(goal_id, week = %latest, "week already evaluated");
            return Ok(PhaseUpdate::unchanged(&state));
        }

        let result = evaluate(state.phase, &history);
        let next = state.advance(result.phase, latest);
        self.store.compare_and_swap(state.version, &next)?;

        if let Some(transition) = result.transition {
            tracing::info!(
                goal_id,
                from = %transition.from,
                to = %transition.to,
                week = %latest,
                "goal phase changed"
            );
        }

        Ok(PhaseUpdate {
            goal_id: goal_id.to_string(),
            previous: state.phase,
            phase: next.phase,
            transition: result.transition,
            version: next.version,
            evaluated_through: next.evaluated_through,
            persisted: true,
        })
    }

    /// [`record_week`](Self::record_week), retrying on version conflicts.
    pub fn record_week_retrying(
        &self,
        goal_id: &str,
        snapshots: &[WeeklySnapshot],
        max_attempts: u32,
    ) -> Result<PhaseUpdate> {
        let mut attempt = 1;
        loop {
            match self.record_week(goal_id, snapshots) {
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    tracing::debug!(goal_id, attempt, "retrying after phase conflict");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPhaseStore;
    use chrono::Duration;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn weeks(ratios: &[f64]) -> Vec<WeeklySnapshot> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        ratios
            .iter()
            .enumerate()
            .map(|(i, &r)| WeeklySnapshot::new(start + Duration::weeks(i as i64), 4.0, r * 4.0))
            .collect()
    }

    fn seeded(phase: GoalPhase) -> PhaseEngine<MemoryPhaseStore> {
        let store = MemoryPhaseStore::new();
        let mut state = GoalPhaseState::new("g1");
        state.phase = phase;
        state.version = 1;
        store.compare_and_swap(0, &state).unwrap();
        PhaseEngine::new(store)
    }

    #[test]
    fn test_unknown_goal_starts_in_acquisition() {
        let engine = PhaseEngine::new(MemoryPhaseStore::new());
        let update = engine.record_week("g1", &[]).unwrap();
        assert_eq!(update.phase, GoalPhase::Acquisition);
        assert!(!update.persisted);
    }

    #[test]
    fn test_promotion_is_persisted() {
        let engine = PhaseEngine::new(MemoryPhaseStore::new());
        let update = engine.record_week("g1", &weeks(&[1.0, 1.2, 1.1, 1.0])).unwrap();
        assert_eq!(update.previous, GoalPhase::Acquisition);
        assert_eq!(update.phase, GoalPhase::Consolidation);
        assert!(update.transition.is_some());
        assert_eq!(update.version, 1);

        let stored = engine.current("g1").unwrap();
        assert_eq!(stored.phase, GoalPhase::Consolidation);
    }

    #[test]
    fn test_replaying_same_week_does_not_transition_twice() {
        let engine = PhaseEngine::new(MemoryPhaseStore::new());
        let history = weeks(&[1.0; 8]);

        let first = engine.record_week("g1", &history).unwrap();
        let second = engine.record_week("g1", &history).unwrap();

        assert_eq!(first.phase, GoalPhase::Consolidation);
        assert_eq!(second.phase, GoalPhase::Consolidation);
        assert!(!second.persisted);
        assert_eq!(engine.current("g1").unwrap().version, 1);
    }

    #[test]
    fn test_each_new_week_evaluated_once() {
        let engine = seeded(GoalPhase::Graduated);
        let history = weeks(&[0.2, 0.1, 0.0]);

        let update = engine.record_week("g1", &history[..2]).unwrap();
        assert_eq!(update.phase, GoalPhase::Consolidation);

        let update = engine.record_week("g1", &history).unwrap();
        assert_eq!(update.phase, GoalPhase::Acquisition);
        assert_eq!(update.version, 3);
    }

    #[test]
    fn test_rewound_history_rejected() {
        let engine = PhaseEngine::new(MemoryPhaseStore::new());
        let history = weeks(&[1.0, 1.0, 1.0]);
        engine.record_week("g1", &history).unwrap();

        let result = engine.record_week("g1", &history[..1]);
        assert!(matches!(result, Err(SummitError::InvalidHistory { .. })));
    }

    #[test]
    fn test_invalid_history_not_persisted() {
        let engine = PhaseEngine::new(MemoryPhaseStore::new());
        let mut history = weeks(&[1.0, 1.0]);
        history.reverse();
        assert!(engine.record_week("g1", &history).is_err());
        assert!(engine.store().get("g1").unwrap().is_none());
    }

    /// Store that lets a competing writer win the first compare-and-swap.
    struct RacingStore {
        inner: MemoryPhaseStore,
        raced: AtomicBool,
    }

    impl PhaseStore for RacingStore {
        fn get(&self, goal_id: &str) -> Result<Option<GoalPhaseState>> {
            self.inner.get(goal_id)
        }

        fn compare_and_swap(&self, expected_version: u64, state: &GoalPhaseState) -> Result<()> {
            if !self.raced.swap(true, Ordering::SeqCst) {
                // The competing writer evaluated the same week first.
                self.inner.compare_and_swap(expected_version, state)?;
            }
            self.inner.compare_and_swap(expected_version, state)
        }

        fn list(&self) -> Result<Vec<GoalPhaseState>> {
            self.inner.list()
        }

        fn delete(&self, goal_id: &str) -> Result<()> {
            self.inner.delete(goal_id)
        }
    }

    #[test]
    fn test_lost_race_reports_conflict() {
        let store = RacingStore {
            inner: MemoryPhaseStore::new(),
            raced: AtomicBool::new(false),
        };
        let engine = PhaseEngine::new(store);
        let result = engine.record_week("g1", &weeks(&[1.0; 4]));
        assert!(matches!(result, Err(SummitError::Conflict { .. })));
    }

    #[test]
    fn test_retry_after_race_applies_single_transition() {
        let inner = MemoryPhaseStore::new();
        let mut state = GoalPhaseState::new("g1");
        state.phase = GoalPhase::Graduated;
        state.version = 1;
        inner.compare_and_swap(0, &state).unwrap();

        let engine = PhaseEngine::new(RacingStore {
            inner,
            raced: AtomicBool::new(false),
        });
        let update = engine
            .record_week_retrying("g1", &weeks(&[0.1, 0.1]), 3)
            .unwrap();

        assert_eq!(update.phase, GoalPhase::Consolidation);
        assert!(!update.persisted, "the competing writer already applied it");
        let stored = engine.current("g1").unwrap();
        assert_eq!(stored.phase, GoalPhase::Consolidation);
        assert_eq!(stored.version, 2);
    }

    #[test]
    fn test_concurrent_rollovers_apply_one_regression() {
        let store = Arc::new(MemoryPhaseStore::new());
        let mut state = GoalPhaseState::new("g1");
        state.phase = GoalPhase::Graduated;
        state.version = 1;
        store.compare_and_swap(0, &state).unwrap();

        let engine = Arc::new(PhaseEngine::new(Arc::clone(&store)));
        let history = weeks(&[0.2, 0.3]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let history = history.clone();
                std::thread::spawn(move || engine.record_week_retrying("g1", &history, 10))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let stored = store.get("g1").unwrap().unwrap();
        assert_eq!(stored.phase, GoalPhase::Consolidation);
        assert_eq!(stored.version, 2);
    }
}
