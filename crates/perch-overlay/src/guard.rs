#![forbid(unsafe_code)]

//! Shared resources guarded across panels: scroll lock and history entries.
//!
//! Both guards are plain counters/stacks mutated synchronously from lifecycle
//! transitions. They report *edges* (locked → unlocked, owner popped) so the
//! manager can touch the host only when the observable state changes.

use crate::arena::PanelId;

/// Reference-counted document scroll lock.
///
/// The document is locked while at least one locking panel is mounted.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    count: usize,
    underflows: usize,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a reference. Returns `true` when this locked the document.
    pub fn acquire(&mut self) -> bool {
        self.count += 1;
        self.count == 1
    }

    /// Drop a reference. Returns `true` when this unlocked the document.
    ///
    /// Releasing more than was acquired is a lifecycle bug; it is logged and
    /// the count stays at zero so scroll is never left locked.
    pub fn release(&mut self) -> bool {
        match self.count {
            0 => {
                self.underflows += 1;
                tracing::warn!(underflows = self.underflows, "scroll lock released below zero");
                false
            }
            n => {
                self.count = n - 1;
                self.count == 0
            }
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.count > 0
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of clamped underflows observed (diagnostics).
    #[inline]
    pub fn underflows(&self) -> usize {
        self.underflows
    }
}

/// Stack of panels that pushed a history entry when they opened.
///
/// A back navigation pops the most recent entry, which the manager treats as
/// a close request for its owner. When an owner closes some other way its
/// entry is released and the manager rewinds history itself; the echo
/// `PopState` that rewind produces is swallowed via `pending_pops`.
#[derive(Debug, Clone, Default)]
pub struct HistoryGuard {
    owners: Vec<PanelId>,
    pending_pops: usize,
}

impl HistoryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` pushed an entry.
    pub fn push(&mut self, id: PanelId) {
        self.owners.push(id);
    }

    /// Handle a back navigation.
    ///
    /// Returns the panel whose entry was popped, or `None` when the pop was
    /// one the manager triggered itself or no guarded panel is open.
    pub fn on_pop_state(&mut self) -> Option<PanelId> {
        if self.pending_pops > 0 {
            self.pending_pops -= 1;
            return None;
        }
        self.owners.pop()
    }

    /// Forget `id`'s entry because it closed without a back navigation.
    ///
    /// Returns `true` if an entry was still outstanding; the caller must then
    /// rewind host history once.
    pub fn release(&mut self, id: PanelId) -> bool {
        match self.owners.iter().rposition(|owner| *owner == id) {
            Some(index) => {
                self.owners.remove(index);
                self.pending_pops += 1;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.owners.contains(&id)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.owners.len()
    }

    /// Self-inflicted pops still expected from the host.
    #[inline]
    pub fn pending_pops(&self) -> usize {
        self.pending_pops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::PanelArena;

    fn ids(n: usize) -> Vec<PanelId> {
        let mut arena = PanelArena::new();
        (0..n).map(|_| arena.insert_with(|_| ())).collect()
    }

    #[test]
    fn lock_edges() {
        let mut lock = ScrollLock::new();
        assert!(lock.acquire());
        assert!(!lock.acquire());
        assert!(!lock.release());
        assert!(lock.is_locked());
        assert!(lock.release());
        assert!(!lock.is_locked());
    }

    #[test]
    fn underflow_clamps_and_counts() {
        let mut lock = ScrollLock::new();
        assert!(!lock.release());
        assert_eq!(lock.count(), 0);
        assert_eq!(lock.underflows(), 1);
        // A later acquire still locks from zero.
        assert!(lock.acquire());
        assert!(lock.is_locked());
    }

    #[test]
    fn pop_state_returns_latest_owner() {
        let ids = ids(2);
        let mut history = HistoryGuard::new();
        history.push(ids[0]);
        history.push(ids[1]);
        assert_eq!(history.on_pop_state(), Some(ids[1]));
        assert_eq!(history.on_pop_state(), Some(ids[0]));
        assert_eq!(history.on_pop_state(), None);
    }

    #[test]
    fn release_swallows_echo_pop() {
        let ids = ids(2);
        let mut history = HistoryGuard::new();
        history.push(ids[0]);
        history.push(ids[1]);
        assert!(history.release(ids[1]));
        assert_eq!(history.pending_pops(), 1);
        // The host's echo of our own rewind is not a close request.
        assert_eq!(history.on_pop_state(), None);
        // A genuine back navigation closes the remaining owner.
        assert_eq!(history.on_pop_state(), Some(ids[0]));
    }

    #[test]
    fn release_unknown_is_noop() {
        let ids = ids(1);
        let mut history = HistoryGuard::new();
        assert!(!history.release(ids[0]));
        assert_eq!(history.pending_pops(), 0);
    }
}
