//! Disk-resident balanced multiway tree for dictionary and postings storage.
//!
//! The tree keeps every node within the classic occupancy bounds of a
//! minimum-degree-`t` multiway search tree: at most `2t - 1` entries per
//! node, at least `t - 1` on every node but the root. Nodes are persisted
//! individually through a [`NodeStore`], addressed by stable identities
//! that survive process restarts, with the root always resident in memory.
//!
//! # Example
//!
//! ```no_run
//! use lexicon_tree::{LexTree, LexTreeConfig};
//! use lexicon_common::types::{Postings, TermId};
//!
//! # fn main() -> lexicon_tree::LexTreeResult<()> {
//! let mut tree = LexTree::open("/var/lib/lexicon/terms", LexTreeConfig::default())?;
//! tree.insert(TermId::new(42), Postings::from_bytes(b"doc:1 doc:9"))?;
//! assert!(tree.get(TermId::new(42))?.is_some());
//! tree.remove(TermId::new(42))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod node;
pub mod store;
pub mod tree;

#[cfg(test)]
mod tree_invariant_tests;

pub use config::LexTreeConfig;
pub use error::{LexTreeError, LexTreeResult};
pub use node::{Entry, Node};
pub use store::{DiskNodeStore, MemNodeStore, NodeStore};
pub use tree::{LexTree, TreeStats};
