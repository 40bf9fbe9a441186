//! Configuration for the lexicon tree storage engine.

use lexicon_common::constants::{DEFAULT_MIN_DEGREE, MIN_DEGREE_FLOOR};

/// Configuration for a tree instance.
#[derive(Debug, Clone)]
pub struct LexTreeConfig {
    /// Minimum degree `t` of the tree.
    ///
    /// Every node holds at most `2t - 1` entries, and every non-root node
    /// holds at least `t - 1`.
    pub min_degree: usize,

    /// Whether every durable write is followed by an fsync (default: true).
    ///
    /// Tests may disable this to avoid paying the sync cost; production
    /// trees must leave it on for the crash-stability guarantees to hold.
    pub sync_writes: bool,
}

impl Default for LexTreeConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
            sync_writes: true,
        }
    }
}

impl LexTreeConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum degree, clamped to the legal floor of 2.
    pub fn with_min_degree(mut self, t: usize) -> Self {
        self.min_degree = t.max(MIN_DEGREE_FLOOR);
        self
    }

    /// Enables or disables per-write fsync.
    pub fn with_sync_writes(mut self, enable: bool) -> Self {
        self.sync_writes = enable;
        self
    }

    /// Maximum number of entries a node may hold (`2t - 1`).
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Minimum number of entries a non-root node must hold (`t - 1`).
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    /// Creates a test configuration with the smallest legal degree, so a
    /// handful of inserts already exercises splits and merges, and without
    /// fsync so suites stay fast.
    pub fn for_testing() -> Self {
        Self {
            min_degree: MIN_DEGREE_FLOOR,
            sync_writes: false,
        }
    }
}
