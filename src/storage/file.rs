//! File-based phase storage for Summit.
//!
//! Each goal's phase is stored as `<goal_id>.json` in a directory.
//! Atomic writes are achieved via temp file + rename pattern. A store-level
//! mutex serializes compare-and-swap within one process.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, SummitError};
use crate::phase::GoalPhaseState;
use crate::storage::traits::check_successor;
use crate::storage::PhaseStore;

/// File-based phase storage.
#[derive(Debug)]
pub struct FilePhaseStore {
    /// Directory where phase files are stored.
    dir: PathBuf,
    /// Held across read-compare-write.
    write_lock: Mutex<()>,
}

impl FilePhaseStore {
    /// Create a store in `dir`, creating the directory if needed.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| SummitError::storage(&dir, e))?;
        }

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Goal ids become file names, so restrict them to a safe alphabet.
    fn validate_id(goal_id: &str) -> Result<()> {
        let ok = !goal_id.is_empty()
            && !goal_id.starts_with('.')
            && goal_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !ok {
            return Err(SummitError::invalid_config(format!(
                "goal id '{}' cannot be used as a file name",
                goal_id
            )));
        }
        Ok(())
    }

    fn state_path(&self, goal_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", goal_id))
    }

    fn temp_path(&self, goal_id: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", goal_id))
    }

    fn read_state(&self, path: &Path) -> Result<GoalPhaseState> {
        let content = fs::read_to_string(path).map_err(|e| SummitError::storage(path, e))?;
        let state: GoalPhaseState = serde_json::from_str(&content)?;
        Ok(state)
    }

    /// Write a state atomically using temp file + rename.
    fn atomic_write(&self, state: &GoalPhaseState) -> Result<()> {
        let final_path = self.state_path(&state.goal_id);
        let temp_path = self.temp_path(&state.goal_id);

        let json = serde_json::to_string_pretty(state)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| SummitError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| SummitError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| SummitError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path).map_err(|e| SummitError::storage(&final_path, e))?;

        Ok(())
    }
}

impl PhaseStore for FilePhaseStore {
    fn get(&self, goal_id: &str) -> Result<Option<GoalPhaseState>> {
        Self::validate_id(goal_id)?;
        let path = self.state_path(goal_id);

        if !path.exists() {
            return Ok(None);
        }

        self.read_state(&path).map(Some)
    }

    fn compare_and_swap(&self, expected_version: u64, state: &GoalPhaseState) -> Result<()> {
        Self::validate_id(&state.goal_id)?;
        check_successor(expected_version, state)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| SummitError::invariant("phase store lock poisoned"))?;

        let actual = self.get(&state.goal_id)?.map(|s| s.version).unwrap_or(0);
        if actual != expected_version {
            return Err(SummitError::conflict(
                &state.goal_id,
                expected_version,
                actual,
            ));
        }

        self.atomic_write(state)
    }

    fn list(&self) -> Result<Vec<GoalPhaseState>> {
        let mut states = Vec::new();

        let entries = fs::read_dir(&self.dir).map_err(|e| SummitError::storage(&self.dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| SummitError::storage(&self.dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
            {
                continue;
            }

            states.push(self.read_state(&path)?);
        }

        states.sort_by(|a, b| a.goal_id.cmp(&b.goal_id));
        Ok(states)
    }

    fn delete(&self, goal_id: &str) -> Result<()> {
        Self::validate_id(goal_id)?;
        let path = self.state_path(goal_id);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| SummitError::storage(&path, e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::GoalPhase;
    use crate::storage::traits::tests::test_phase_store_cas;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_cas() {
        let temp = TempDir::new().unwrap();
        let store = FilePhaseStore::with_dir(temp.path()).unwrap();
        test_phase_store_cas(&store);
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("phases");
        let store = FilePhaseStore::with_dir(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = FilePhaseStore::with_dir(temp.path()).unwrap();
        let week = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        let state = GoalPhaseState::new("run-5k").advance(GoalPhase::Acquisition, week);
        store.compare_and_swap(0, &state).unwrap();

        assert!(temp.path().join("run-5k.json").exists());
        assert!(!temp.path().join(".run-5k.json.tmp").exists());
    }

    #[test]
    fn test_persists_across_instances() {
        let temp = TempDir::new().unwrap();
        let week = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        {
            let store = FilePhaseStore::with_dir(temp.path()).unwrap();
            let state = GoalPhaseState::new("g1").advance(GoalPhase::Graduated, week);
            store.compare_and_swap(0, &state).unwrap();
        }

        let store = FilePhaseStore::with_dir(temp.path()).unwrap();
        let loaded = store.get("g1").unwrap().unwrap();
        assert_eq!(loaded.phase, GoalPhase::Graduated);
        assert_eq!(loaded.evaluated_through, Some(week));
    }

    #[test]
    fn test_unsafe_ids_rejected() {
        let temp = TempDir::new().unwrap();
        let store = FilePhaseStore::with_dir(temp.path()).unwrap();
        assert!(store.get("../escape").is_err());
        assert!(store.get(".hidden").is_err());
        assert!(store.get("").is_err());
    }

    #[test]
    fn test_corrupt_file_is_serde_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("bad.json"), "not json").unwrap();
        let store = FilePhaseStore::with_dir(temp.path()).unwrap();
        assert!(matches!(store.get("bad"), Err(SummitError::Serde { .. })));
    }
}
