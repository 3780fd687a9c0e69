//! In-memory cache of computed badge statuses.
//!
//! Badges are derived data. The cache only saves recomputation; callers
//! invalidate an entry whenever a child goal's progress or phase changes.
//!
//! Every invalidation bumps a generation counter. A status computed while
//! an invalidation ran is returned to its caller but never stored.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::badge::BadgeStatus;
use crate::catalog::TemplateGraph;
use crate::error::{Result, SummitError};

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, BadgeStatus>,
    generation: u64,
}

impl CacheState {
    fn invalidated(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Thread-safe cache of badge statuses keyed by L2 id.
#[derive(Debug, Default)]
pub struct BadgeCache {
    state: RwLock<CacheState>,
}

impl BadgeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CacheState>> {
        self.state
            .read()
            .map_err(|e| SummitError::invariant(format!("badge cache lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CacheState>> {
        self.state
            .write()
            .map_err(|e| SummitError::invariant(format!("badge cache lock poisoned: {}", e)))
    }

    /// Cached status for a badge.
    pub fn get(&self, badge_id: &str) -> Result<Option<BadgeStatus>> {
        Ok(self.read()?.entries.get(badge_id).cloned())
    }

    /// Store a status, replacing any previous entry.
    pub fn insert(&self, status: BadgeStatus) -> Result<()> {
        self.write()?
            .entries
            .insert(status.badge_id.clone(), status);
        Ok(())
    }

    /// Return the cached status or compute and store it.
    ///
    /// Errors from `compute` are returned and nothing is cached. If the cache
    /// was invalidated while `compute` ran, the result is returned but not
    /// stored, since it may reflect pre-invalidation inputs.
    pub fn get_or_compute<F>(&self, badge_id: &str, compute: F) -> Result<BadgeStatus>
    where
        F: FnOnce() -> Result<BadgeStatus>,
    {
        let generation = {
            let state = self.read()?;
            if let Some(status) = state.entries.get(badge_id) {
                tracing::trace!(badge_id, "badge cache hit");
                return Ok(status.clone());
            }
            state.generation
        };

        let status = compute()?;

        let mut state = self.write()?;
        if state.generation == generation {
            state.entries.insert(badge_id.to_string(), status.clone());
        } else {
            tracing::debug!(badge_id, "cache invalidated during compute, not storing");
        }
        Ok(status)
    }

    /// Drop one badge. Returns whether an entry was present.
    pub fn invalidate(&self, badge_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        state.invalidated();
        Ok(state.entries.remove(badge_id).is_some())
    }

    /// Drop every badge that has `l3_id` as a child.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_for_goal(&self, graph: &TemplateGraph, l3_id: &str) -> Result<usize> {
        let parents = graph.get_parents(l3_id)?;
        let mut state = self.write()?;
        state.invalidated();
        let removed = parents
            .iter()
            .filter(|parent| state.entries.remove(parent.id.as_str()).is_some())
            .count();
        tracing::debug!(goal = l3_id, removed, "invalidated cached badges");
        Ok(removed)
    }

    /// Drop everything.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.write()?;
        state.invalidated();
        state.entries.clear();
        Ok(())
    }

    /// Number of cached badges.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
