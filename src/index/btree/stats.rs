//! B-tree statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by a B-tree and its node arena.
///
/// All fields are atomic so the counters can be shared through an `Arc` and
/// read after the tree itself is gone. `Ordering::Relaxed` is enough: each
/// counter is independent.
///
/// # Example
/// ```
/// use basefs::IndexStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = IndexStats::new();
/// stats.splits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().splits, 1);
/// ```
#[derive(Debug)]
pub struct IndexStats {
    /// Nodes handed out by the arena.
    pub nodes_allocated: AtomicU64,

    /// Nodes released back to the arena.
    pub nodes_freed: AtomicU64,

    /// Node splits performed.
    pub splits: AtomicU64,

    /// Times a new root was created above the old one.
    pub height_growths: AtomicU64,

    /// Successful key insertions.
    pub inserts: AtomicU64,

    /// Search calls.
    pub searches: AtomicU64,

    /// Allocation requests that were refused.
    pub allocation_failures: AtomicU64,
}

impl IndexStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            nodes_allocated: AtomicU64::new(0),
            nodes_freed: AtomicU64::new(0),
            splits: AtomicU64::new(0),
            height_growths: AtomicU64::new(0),
            inserts: AtomicU64::new(0),
            searches: AtomicU64::new(0),
            allocation_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            nodes_allocated: self.nodes_allocated.load(Ordering::Relaxed),
            nodes_freed: self.nodes_freed.load(Ordering::Relaxed),
            splits: self.splits.load(Ordering::Relaxed),
            height_growths: self.height_growths.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            allocation_failures: self.allocation_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for IndexStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub nodes_allocated: u64,
    pub nodes_freed: u64,
    pub splits: u64,
    pub height_growths: u64,
    pub inserts: u64,
    pub searches: u64,
    pub allocation_failures: u64,
}

impl StatsSnapshot {
    /// Nodes allocated and not yet freed.
    pub fn live_nodes(&self) -> u64 {
        self.nodes_allocated.saturating_sub(self.nodes_freed)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ live_nodes: {}, inserts: {}, searches: {}, splits: {}, height_growths: {} }}",
            self.live_nodes(),
            self.inserts,
            self.searches,
            self.splits,
            self.height_growths
        )
    }
}
