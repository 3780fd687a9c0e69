//! In-memory phase storage.
//!
//! Thread-safe implementation of the PhaseStore trait, used by tests and
//! by callers that persist phases elsewhere.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, SummitError};
use crate::phase::GoalPhaseState;
use crate::storage::traits::check_successor;
use crate::storage::PhaseStore;

/// In-memory phase store.
///
/// Compare-and-swap happens under a single write lock.
#[derive(Debug, Default)]
pub struct MemoryPhaseStore {
    states: RwLock<HashMap<String, GoalPhaseState>>,
}

impl MemoryPhaseStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, GoalPhaseState>>> {
        self.states
            .read()
            .map_err(|_| SummitError::invariant("phase store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, GoalPhaseState>>> {
        self.states
            .write()
            .map_err(|_| SummitError::invariant("phase store lock poisoned"))
    }

    /// Get the number of stored goals.
    pub fn len(&self) -> usize {
        self.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PhaseStore for MemoryPhaseStore {
    fn get(&self, goal_id: &str) -> Result<Option<GoalPhaseState>> {
        Ok(self.read()?.get(goal_id).cloned())
    }

    fn compare_and_swap(&self, expected_version: u64, state: &GoalPhaseState) -> Result<()> {
        check_successor(expected_version, state)?;

        let mut states = self.write()?;
        let actual = states.get(&state.goal_id).map(|s| s.version).unwrap_or(0);
        if actual != expected_version {
            return Err(SummitError::conflict(
                &state.goal_id,
                expected_version,
                actual,
            ));
        }
        states.insert(state.goal_id.clone(), state.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<GoalPhaseState>> {
        let mut result: Vec<GoalPhaseState> = self.read()?.values().cloned().collect();
        result.sort_by(|a, b| a.goal_id.cmp(&b.goal_id));
        Ok(result)
    }

    fn delete(&self, goal_id: &str) -> Result<()> {
        self.write()?.remove(goal_id);
        Ok(())
    }
}
