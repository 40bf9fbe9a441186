//! Node type for the lexicon tree.
//!
//! A node is one page of the tree: a sorted run of `(TermId, Postings)`
//! entries plus, for internal nodes, one child link per gap. Nodes carry
//! their durable identity with them so the storage layer can route a write
//! without extra context.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use lexicon_common::constants::{NODE_FORMAT_VERSION, NODE_MAGIC};
use lexicon_common::types::{NodeId, Postings, TermId};

use crate::error::{LexTreeError, LexTreeResult};

/// One key-value entry held by a node.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The dictionary term id.
    pub key: TermId,
    /// The postings payload stored against it.
    pub value: Postings,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(key: TermId, value: Postings) -> Self {
        Self { key, value }
    }
}

/// A page of the tree.
///
/// Invariants (maintained by the tree algorithms, relied on here):
/// - `entries` is strictly increasing by key;
/// - a leaf has no links; an internal node has exactly `entries.len() + 1`;
/// - every key reachable under `links[i]` is less than `entries[i].key`,
///   which is less than every key reachable under `links[i + 1]`.
#[derive(Debug, Clone)]
pub struct Node {
    /// Durable identity; [`NodeId::ROOT`] for whichever node is the root.
    pub id: NodeId,
    /// Whether this node is a leaf.
    pub is_leaf: bool,
    /// Sorted entries, at most `2t - 1` of them.
    pub entries: Vec<Entry>,
    /// Child identities, `entries.len() + 1` of them when internal.
    pub links: Vec<NodeId>,
}

impl Node {
    /// Creates a new empty leaf node.
    pub fn new_leaf(id: NodeId) -> Self {
        Self {
            id,
            is_leaf: true,
            entries: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Creates a new empty internal node.
    pub fn new_internal(id: NodeId) -> Self {
        Self {
            id,
            is_leaf: false,
            entries: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Returns the number of entries currently held.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Binary search over the sorted keys.
    ///
    /// `Ok(i)` is the position of an exact match. `Err(i)` is the insertion
    /// point: the smallest index whose key exceeds the search key, which is
    /// also the index of the child link to descend into.
    pub fn search(&self, key: TermId) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| e.key.cmp(&key))
    }

    /// Serializes the full node state to bytes.
    ///
    /// Layout: magic (u16 le), format version (u8), is_leaf (u8), id (u64
    /// le), count (u32 le), then `count` entries as key (i64 le) +
    /// payload length (u32 le) + payload bytes, then `count + 1` child ids
    /// (u64 le) when internal.
    pub fn serialize(&self) -> Bytes {
        let payload: usize = self.entries.iter().map(|e| 12 + e.value.len()).sum();
        let mut buf = BytesMut::with_capacity(16 + payload + 8 * self.links.len());
        buf.put_u16_le(NODE_MAGIC);
        buf.put_u8(NODE_FORMAT_VERSION);
        buf.put_u8(u8::from(self.is_leaf));
        buf.put_u64_le(self.id.as_u64());
        buf.put_u32_le(self.entries.len() as u32);
        for entry in &self.entries {
            buf.put_i64_le(entry.key.as_i64());
            buf.put_u32_le(entry.value.len() as u32);
            buf.put_slice(entry.value.as_bytes());
        }
        for link in &self.links {
            buf.put_u64_le(link.as_u64());
        }
        buf.freeze()
    }

    /// Deserializes a node from bytes, validating the header.
    pub fn deserialize(data: &[u8]) -> LexTreeResult<Self> {
        let mut buf = data;
        if buf.remaining() < 16 {
            return Err(LexTreeError::corrupted("buffer too small for node header"));
        }

        let magic = buf.get_u16_le();
        if magic != NODE_MAGIC {
            return Err(LexTreeError::corrupted(format!(
                "invalid node magic: expected 0x{NODE_MAGIC:04X}, got 0x{magic:04X}"
            )));
        }
        let version = buf.get_u8();
        if version != NODE_FORMAT_VERSION {
            return Err(LexTreeError::corrupted(format!(
                "unsupported node format version {version}"
            )));
        }
        let is_leaf = match buf.get_u8() {
            0 => false,
            1 => true,
            other => {
                return Err(LexTreeError::corrupted(format!(
                    "invalid leaf flag {other}"
                )))
            }
        };
        let id = NodeId::new(buf.get_u64_le());
        let count = buf.get_u32_le() as usize;

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            if buf.remaining() < 12 {
                return Err(LexTreeError::corrupted("buffer too small for entry"));
            }
            let key = TermId::new(buf.get_i64_le());
            let len = buf.get_u32_le() as usize;
            if buf.remaining() < len {
                return Err(LexTreeError::corrupted("buffer too small for payload"));
            }
            let value = Postings::from_bytes(&buf[..len]);
            buf.advance(len);
            entries.push(Entry::new(key, value));
        }

        let mut links = Vec::new();
        if !is_leaf {
            links.reserve(count + 1);
            for _ in 0..count + 1 {
                if buf.remaining() < 8 {
                    return Err(LexTreeError::corrupted("buffer too small for links"));
                }
                links.push(NodeId::new(buf.get_u64_le()));
            }
        }

        Ok(Self {
            id,
            is_leaf,
            entries,
            links,
        })
    }
}
