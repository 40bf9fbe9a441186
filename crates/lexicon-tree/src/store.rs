//! Node persistence.
//!
//! The tree never touches the filesystem directly; it goes through a
//! [`NodeStore`], which maps node identities to persisted byte slots.
//! [`DiskNodeStore`] is the production implementation with one file per
//! node; [`MemNodeStore`] backs fast tests.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use lexicon_common::types::NodeId;
use tracing::debug;

use crate::error::{LexTreeError, LexTreeResult};
use crate::node::Node;

/// Persistence interface for tree nodes.
///
/// A store routes by identity: the distinguished root token always resolves
/// to the root slot, so the root survives structural changes without any
/// node holding a pointer to it. Identities are allocated strictly
/// increasing and never reused, even across reopen.
pub trait NodeStore {
    /// Hands out the next unused node identity, durably advancing the
    /// allocation counter before returning.
    fn allocate(&mut self) -> LexTreeResult<NodeId>;

    /// Reads and decodes the node persisted under `id`.
    ///
    /// Returns an integrity fault if no slot exists for the identity.
    fn read(&self, id: NodeId) -> LexTreeResult<Node>;

    /// Persists the full state of `node` under its own identity,
    /// overwriting any previous state.
    fn write(&mut self, node: &Node) -> LexTreeResult<()>;

    /// Removes the slot persisted under `id`.
    ///
    /// Returns an integrity fault if no slot exists for the identity.
    fn delete(&mut self, id: NodeId) -> LexTreeResult<()>;

    /// Whether a root slot has ever been persisted.
    fn has_root(&self) -> bool;
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemNodeStore {
    slots: HashMap<NodeId, Bytes>,
    next_id: u64,
}

impl MemNodeStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            next_id: NodeId::FIRST.as_u64(),
        }
    }

    /// Number of slots currently held, the root slot included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl NodeStore for MemNodeStore {
    fn allocate(&mut self) -> LexTreeResult<NodeId> {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    fn read(&self, id: NodeId) -> LexTreeResult<Node> {
        let data = self
            .slots
            .get(&id)
            .ok_or_else(|| LexTreeError::integrity_fault(id))?;
        Node::deserialize(data)
    }

    fn write(&mut self, node: &Node) -> LexTreeResult<()> {
        self.slots.insert(node.id, node.serialize());
        Ok(())
    }

    fn delete(&mut self, id: NodeId) -> LexTreeResult<()> {
        self.slots
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LexTreeError::integrity_fault(id))
    }

    fn has_root(&self) -> bool {
        self.slots.contains_key(&NodeId::ROOT)
    }
}

/// File name of the allocation counter.
const NEXT_ID_FILE: &str = "next_id";

/// Disk-backed store: one file per node inside a dedicated directory.
///
/// Layout: `root.node` for the root slot, `{n}.node` for each allocated
/// identity, and `next_id` holding the 8-byte little-endian allocation
/// counter. The counter is persisted before an identity is handed out, so
/// reopening after a crash can never re-issue an id.
#[derive(Debug)]
pub struct DiskNodeStore {
    dir: PathBuf,
    next_id: u64,
    sync_writes: bool,
}

impl DiskNodeStore {
    /// Opens a store rooted at `dir`, creating the directory if needed and
    /// recovering the allocation counter from a previous run.
    pub fn open(dir: impl Into<PathBuf>, sync_writes: bool) -> LexTreeResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let counter_path = dir.join(NEXT_ID_FILE);
        let next_id = match fs::read(&counter_path) {
            Ok(raw) => {
                let bytes: [u8; 8] = raw.as_slice().try_into().map_err(|_| {
                    LexTreeError::corrupted(format!(
                        "allocation counter has {} bytes, expected 8",
                        raw.len()
                    ))
                })?;
                u64::from_le_bytes(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => NodeId::FIRST.as_u64(),
            Err(e) => return Err(e.into()),
        };

        debug!(dir = %dir.display(), next_id, "opened node store");
        Ok(Self {
            dir,
            next_id,
            sync_writes,
        })
    }

    fn slot_path(&self, id: NodeId) -> PathBuf {
        if id.is_root() {
            self.dir.join("root.node")
        } else {
            self.dir.join(format!("{}.node", id.as_u64()))
        }
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> LexTreeResult<()> {
        let mut file =
            fs::File::create(path).map_err(|e| LexTreeError::storage_write(path, e))?;
        file.write_all(data)
            .map_err(|e| LexTreeError::storage_write(path, e))?;
        if self.sync_writes {
            file.sync_all()
                .map_err(|e| LexTreeError::storage_write(path, e))?;
        }
        Ok(())
    }
}

impl NodeStore for DiskNodeStore {
    fn allocate(&mut self) -> LexTreeResult<NodeId> {
        let id = NodeId::new(self.next_id);
        let advanced = self.next_id + 1;
        // Durably advance the counter before the id escapes.
        let path = self.dir.join(NEXT_ID_FILE);
        self.write_file(&path, &advanced.to_le_bytes())?;
        self.next_id = advanced;
        Ok(id)
    }

    fn read(&self, id: NodeId) -> LexTreeResult<Node> {
        let path = self.slot_path(id);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LexTreeError::integrity_fault(id))
            }
            Err(e) => return Err(e.into()),
        };
        Node::deserialize(&data)
    }

    fn write(&mut self, node: &Node) -> LexTreeResult<()> {
        let path = self.slot_path(node.id);
        self.write_file(&path, &node.serialize())
    }

    fn delete(&mut self, id: NodeId) -> LexTreeResult<()> {
        let path = self.slot_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(LexTreeError::integrity_fault(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn has_root(&self) -> bool {
        self.slot_path(NodeId::ROOT).exists()
    }
}
