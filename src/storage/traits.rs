//! Phase storage traits for Summit.
//!
//! This module defines the `PhaseStore` trait for goal phase persistence.

use std::sync::Arc;

use crate::error::Result;
use crate::phase::GoalPhaseState;

/// Trait for goal phase storage backends.
///
/// Writes go through [`compare_and_swap`](PhaseStore::compare_and_swap) so
/// that concurrent classifications of the same goal cannot both win.
pub trait PhaseStore: Send + Sync {
    /// Retrieve a goal's phase state.
    ///
    /// Returns `Ok(None)` if the goal has never been persisted.
    fn get(&self, goal_id: &str) -> Result<Option<GoalPhaseState>>;

    /// Write `state` only if the stored version equals `expected_version`.
    ///
    /// A missing record counts as version 0. `state.version` must be
    /// `expected_version + 1`. Returns `Conflict` when another writer got
    /// there first.
    fn compare_and_swap(&self, expected_version: u64, state: &GoalPhaseState) -> Result<()>;

    /// List all stored states, ordered by goal id.
    fn list(&self) -> Result<Vec<GoalPhaseState>>;

    /// Delete a goal's state.
    ///
    /// Returns `Ok(())` even if the goal doesn't exist.
    fn delete(&self, goal_id: &str) -> Result<()>;

    /// Check if a goal has stored state.
    fn exists(&self, goal_id: &str) -> Result<bool> {
        Ok(self.get(goal_id)?.is_some())
    }
}

/// Blanket implementation of PhaseStore for Arc-wrapped stores.
///
/// This allows sharing one store between engines and threads.
impl<T: PhaseStore + ?Sized> PhaseStore for Arc<T> {
    fn get(&self, goal_id: &str) -> Result<Option<GoalPhaseState>> {
        (**self).get(goal_id)
    }

    fn compare_and_swap(&self, expected_version: u64, state: &GoalPhaseState) -> Result<()> {
        (**self).compare_and_swap(expected_version, state)
    }

    fn list(&self) -> Result<Vec<GoalPhaseState>> {
        (**self).list()
    }

    fn delete(&self, goal_id: &str) -> Result<()> {
        (**self).delete(goal_id)
    }
}

/// Check the version step shared by every store implementation.
pub(crate) fn check_successor(expected_version: u64, state: &GoalPhaseState) -> Result<()> {
    if state.version != expected_version + 1 {
        return Err(crate::error::SummitError::invariant(format!(
            "phase state for {} has version {}, expected {}",
            state.goal_id,
            state.version,
            expected_version + 1
        )));
    }
    Ok(())
}

/// Test utilities for PhaseStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::error::SummitError;
    use crate::phase::GoalPhase;
    use chrono::NaiveDate;

    /// Test helper to verify PhaseStore implementations.
    pub fn test_phase_store_cas<S: PhaseStore>(store: &S) {
        let week = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        let initial = GoalPhaseState::new("goal-a");

        // Initially should not exist
        assert!(!store.exists("goal-a").unwrap());
        assert!(store.get("goal-a").unwrap().is_none());

        // First write expects version 0
        let v1 = initial.advance(GoalPhase::Consolidation, week);
        store.compare_and_swap(0, &v1).unwrap();
        assert_eq!(store.get("goal-a").unwrap().unwrap(), v1);

        // Stale writer loses
        let stale = initial.advance(GoalPhase::Acquisition, week);
        let err = store.compare_and_swap(0, &stale).unwrap_err();
        assert!(matches!(
            err,
            SummitError::Conflict {
                expected: 0,
                actual: 1,
                ..
            }
        ));
        assert_eq!(store.get("goal-a").unwrap().unwrap().phase, GoalPhase::Consolidation);

        // Version must step by exactly one
        let mut skipped = v1.advance(GoalPhase::Graduated, week);
        skipped.version = 5;
        assert!(matches!(
            store.compare_and_swap(1, &skipped),
            Err(SummitError::InvariantViolation { .. })
        ));

        // Current writer wins
        let v2 = v1.advance(GoalPhase::Graduated, week);
        store.compare_and_swap(1, &v2).unwrap();

        // List includes the goal
        let other = GoalPhaseState::new("goal-b").advance(GoalPhase::Acquisition, week);
        store.compare_and_swap(0, &other).unwrap();
        let ids: Vec<String> = store.list().unwrap().into_iter().map(|s| s.goal_id).collect();
        assert_eq!(ids, vec!["goal-a".to_string(), "goal-b".to_string()]);

        // Delete the goal
        store.delete("goal-a").unwrap();
        assert!(!store.exists("goal-a").unwrap());

        // Delete again should succeed
        store.delete("goal-a").unwrap();
    }
}
