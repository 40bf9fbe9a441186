//! Core types for the lexicon storage engine.
//!
//! These types provide type-safe wrappers around the raw integers and byte
//! sequences flowing through the tree, preventing accidental misuse of
//! different identifier kinds.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Durable identity of a tree node.
///
/// A node is addressed either by the distinguished [`NodeId::ROOT`] token,
/// which always denotes whichever node is currently the tree's root, or by
/// a strictly increasing positive integer assigned once at allocation and
/// never reused.
///
/// # Example
///
/// ```rust
/// use lexicon_common::types::NodeId;
///
/// let id = NodeId::new(42);
/// assert!(!id.is_root());
/// assert!(NodeId::ROOT.is_root());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// The distinguished root token. Always resolves to the current root.
    pub const ROOT: Self = Self(0);

    /// First identity handed out by a fresh allocator.
    pub const FIRST: Self = Self(1);

    /// Creates a `NodeId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether this is the distinguished root token.
    #[inline]
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == Self::ROOT.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "NodeId(ROOT)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u64> for NodeId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<NodeId> for u64 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// A dictionary term identifier, the key type of the tree.
///
/// Term ids are assigned by the surrounding retrieval system; the tree only
/// requires that they order totally, which the signed 64-bit representation
/// provides.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TermId(i64);

impl TermId {
    /// Creates a `TermId` from a raw i64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw i64 value.
    #[inline]
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TermId({})", self.0)
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TermId {
    #[inline]
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl From<TermId> for i64 {
    #[inline]
    fn from(id: TermId) -> Self {
        id.0
    }
}

/// A postings payload stored against a term.
///
/// The tree treats the payload as an opaque variable-length byte sequence;
/// the retrieval system owns its internal encoding.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Postings(Bytes);

impl Postings {
    /// Creates an empty payload.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(Bytes::new())
    }

    /// Creates a payload from a byte slice.
    #[inline]
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    /// Creates a payload from owned bytes.
    #[inline]
    #[must_use]
    pub fn from_vec(vec: Vec<u8>) -> Self {
        Self(Bytes::from(vec))
    }

    /// Creates a payload from a `Bytes` instance without copying.
    #[inline]
    #[must_use]
    pub const fn from_raw(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Returns the length of the payload in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the payload is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the payload as a byte slice.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the underlying `Bytes`.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for Postings {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Postings {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Postings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Postings({} bytes)", self.0.len())
    }
}

impl From<&[u8]> for Postings {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Postings {
    #[inline]
    fn from(vec: Vec<u8>) -> Self {
        Self::from_vec(vec)
    }
}

impl From<Bytes> for Postings {
    #[inline]
    fn from(bytes: Bytes) -> Self {
        Self::from_raw(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(7);
        assert_eq!(id.as_u64(), 7);
        assert!(!id.is_root());
        assert!(NodeId::ROOT.is_root());
        assert_eq!(NodeId::FIRST.as_u64(), 1);
        assert_eq!(format!("{:?}", NodeId::ROOT), "NodeId(ROOT)");
        assert_eq!(format!("{}", NodeId::new(9)), "9");
    }

    #[test]
    fn test_term_id_ordering() {
        assert!(TermId::new(-3) < TermId::new(0));
        assert!(TermId::new(1) < TermId::new(2));
        assert_eq!(TermId::new(5).as_i64(), 5);
    }

    #[test]
    fn test_postings() {
        let p = Postings::from_bytes(b"hello");
        assert_eq!(p.len(), 5);
        assert_eq!(p.as_bytes(), b"hello");
        assert!(!p.is_empty());
        assert!(Postings::empty().is_empty());

        let q: Postings = vec![1u8, 2, 3].into();
        assert_eq!(q.as_bytes(), &[1, 2, 3]);
    }
}
