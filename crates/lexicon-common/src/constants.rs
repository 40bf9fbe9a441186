//! System-wide constants for the lexicon storage engine.

// =============================================================================
// Branching
// =============================================================================

/// Default minimum degree `t` of the balanced tree.
///
/// A full node holds `2t - 1` entries, so with `t = 501` a full node of
/// fixed-width dictionary entries lands close to one storage block, which
/// keeps a single node read/write within one I/O.
pub const DEFAULT_MIN_DEGREE: usize = 501;

/// Smallest legal minimum degree. Below 2 the tree degenerates: a node
/// could not be split into two non-empty halves around a median.
pub const MIN_DEGREE_FLOOR: usize = 2;

// =============================================================================
// On-disk format
// =============================================================================

/// Magic number at the head of every serialized node slot.
pub const NODE_MAGIC: u16 = 0x4C58; // "LX" in ASCII

/// Version number for the node slot format.
pub const NODE_FORMAT_VERSION: u8 = 1;
