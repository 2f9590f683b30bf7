//! Resolution chain tracking for cycle detection.
//!
//! A [`DependencyChainTracker`] belongs to exactly one top-level
//! `resolve` call. The container creates it, then threads it through
//! the [`Resolver`](crate::registration::Resolver) handed to every
//! nested resolver, so the chain is local to that call. Two threads
//! resolving the same service never see each other's chain.
//!
//! Entries are released by [`ChainGuard`] on drop, on success and on
//! resolver errors alike. A rejected re-entry never gets a guard: only
//! its own increment is undone, so the outer entry stays active.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::warn;

use crate::error::{CircularDependencyError, RabtError, Result};
use crate::key::ServiceKey;

/// Keys currently being resolved on one resolution chain.
#[derive(Debug, Default)]
pub struct DependencyChainTracker {
    state: RefCell<ChainState>,
}

#[derive(Debug, Default)]
struct ChainState {
    counts: HashMap<ServiceKey, usize>,
    // entry order, for error reporting
    chain: Vec<ServiceKey>,
}

impl DependencyChainTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records entry into `key` and returns how many times `key` is
    /// now active on this chain. Anything above 1 is a cycle.
    pub fn enter(&self, key: &ServiceKey) -> usize {
        let mut state = self.state.borrow_mut();
        state.chain.push(key.clone());
        let count = state.counts.entry(key.clone()).or_insert(0);
        *count += 1;
        *count
    }

    /// Forgets `key`, as if it had never been entered.
    pub fn exit(&self, key: &ServiceKey) {
        let mut state = self.state.borrow_mut();
        state.counts.remove(key);
        if let Some(pos) = state.chain.iter().rposition(|k| k == key) {
            state.chain.remove(pos);
        }
    }

    /// Enters `key` and returns a guard that exits it on drop.
    ///
    /// # Errors
    /// [`RabtError::CircularDependency`] if `key` is already active.
    /// Only the rejected entry is undone; the outer entry for `key`
    /// stays active until its own guard drops.
    pub fn track(&self, key: &ServiceKey) -> Result<ChainGuard<'_>> {
        let count = self.enter(key);

        if count > 1 {
            let chain = self.cycle_through(key);
            self.undo_reentry(key);
            warn!(key = %key, chain = ?chain, "Circular dependency detected");
            return Err(RabtError::CircularDependency(CircularDependencyError {
                key: key.clone(),
                chain,
            }));
        }

        Ok(ChainGuard {
            tracker: self,
            key: key.clone(),
        })
    }

    /// Whether `key` is being resolved right now.
    pub fn is_active(&self, key: &ServiceKey) -> bool {
        self.state.borrow().counts.contains_key(key)
    }

    /// The innermost key on the chain.
    pub fn current(&self) -> Option<ServiceKey> {
        self.state.borrow().chain.last().cloned()
    }

    pub fn depth(&self) -> usize {
        self.state.borrow().chain.len()
    }

    /// Snapshot of the chain, outermost first.
    pub fn chain(&self) -> Vec<ServiceKey> {
        self.state.borrow().chain.clone()
    }

    // Reverts one `enter` of a key that was already active.
    fn undo_reentry(&self, key: &ServiceKey) {
        let mut state = self.state.borrow_mut();
        if let Some(count) = state.counts.get_mut(key) {
            *count -= 1;
        }
        if let Some(pos) = state.chain.iter().rposition(|k| k == key) {
            state.chain.remove(pos);
        }
    }

    // From the first occurrence of `key` to the end of the chain.
    fn cycle_through(&self, key: &ServiceKey) -> Vec<ServiceKey> {
        let state = self.state.borrow();
        let start = state.chain.iter().position(|k| k == key).unwrap_or(0);
        state.chain[start..].to_vec()
    }
}

/// Exits its key from the tracker when dropped.
#[must_use = "the key is released as soon as the guard is dropped"]
pub struct ChainGuard<'a> {
    tracker: &'a DependencyChainTracker,
    key: ServiceKey,
}

impl ChainGuard<'_> {
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }
}

impl Drop for ChainGuard<'_> {
    fn drop(&mut self) {
        self.tracker.exit(&self.key);
    }
}
