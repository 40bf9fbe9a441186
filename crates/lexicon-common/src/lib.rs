//! # lexicon-common
//!
//! Shared types and constants for the lexicon storage engine.
//!
//! This crate provides the vocabulary used across the lexicon components:
//!
//! - **Types**: `TermId` (dictionary key), `Postings` (opaque byte payload),
//!   and `NodeId` (durable tree-node identity with a distinguished root token)
//! - **Constants**: branching parameters and on-disk magic numbers
//!
//! ## Example
//!
//! ```rust
//! use lexicon_common::types::{NodeId, Postings, TermId};
//!
//! let term = TermId::new(42);
//! let postings = Postings::from_bytes(b"doc:1 doc:7 doc:9");
//! assert!(NodeId::ROOT.is_root());
//! assert_eq!(term.as_i64(), 42);
//! assert_eq!(postings.len(), 17);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::{NodeId, Postings, TermId};
