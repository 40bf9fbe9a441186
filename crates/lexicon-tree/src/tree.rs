//! The tree coordinator.
//!
//! [`LexTree`] holds the current root in memory and performs single-pass
//! descents for lookup, insertion, and deletion. Insertion splits any full
//! node before descending into it, so a child never has to grow its parent
//! retroactively. Deletion tops up any minimal node before descending into
//! it, by borrowing through the parent or merging with a sibling, so no
//! node ever drops below its occupancy floor once the descent has passed.

use std::cmp::Ordering;
use std::mem;
use std::path::PathBuf;

use lexicon_common::types::{NodeId, Postings, TermId};
use tracing::debug;

use crate::config::LexTreeConfig;
use crate::error::{LexTreeError, LexTreeResult};
use crate::node::{Entry, Node};
use crate::store::{DiskNodeStore, NodeStore};

/// Counters and shape summary of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Total number of entries stored.
    pub entry_count: u64,
    /// Number of leaf nodes.
    pub leaf_count: u64,
    /// Number of internal nodes.
    pub internal_count: u64,
    /// Depth of the leaves, counting the root as 1.
    pub height: u32,
    /// Node splits performed since open.
    pub splits: u64,
    /// Node merges performed since open.
    pub merges: u64,
    /// Key rotations performed since open.
    pub rotations: u64,
}

/// A disk-resident ordered map from term ids to postings payloads.
///
/// The root node is always held in memory and re-persisted whenever it is
/// mutated; all other nodes are read from and written to the store as the
/// descent passes through them.
pub struct LexTree<S: NodeStore> {
    config: LexTreeConfig,
    store: S,
    root: Node,
    splits: u64,
    merges: u64,
    rotations: u64,
}

impl LexTree<DiskNodeStore> {
    /// Opens a tree persisted under `path`, initializing an empty one if
    /// the directory holds no root.
    pub fn open(path: impl Into<PathBuf>, config: LexTreeConfig) -> LexTreeResult<Self> {
        let store = DiskNodeStore::open(path, config.sync_writes)?;
        Self::with_store(store, config)
    }
}

impl<S: NodeStore> LexTree<S> {
    /// Opens a tree over an existing store.
    pub fn with_store(mut store: S, config: LexTreeConfig) -> LexTreeResult<Self> {
        let root = if store.has_root() {
            store.read(NodeId::ROOT)?
        } else {
            let root = Node::new_leaf(NodeId::ROOT);
            store.write(&root)?;
            root
        };
        debug!(root_entries = root.count(), "opened tree");
        Ok(Self {
            config,
            store,
            root,
            splits: 0,
            merges: 0,
            rotations: 0,
        })
    }

    /// Returns the configuration this tree was opened with.
    pub fn config(&self) -> &LexTreeConfig {
        &self.config
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf && self.root.count() == 0
    }

    /// Looks up the payload stored against `key`.
    ///
    /// The search terminates at the first node holding the key, leaf or
    /// internal; a miss at a leaf means the key is absent.
    pub fn get(&self, key: TermId) -> LexTreeResult<Option<Postings>> {
        let mut position = match self.root.search(key) {
            Ok(i) => return Ok(Some(self.root.entries[i].value.clone())),
            Err(i) => i,
        };
        if self.root.is_leaf {
            return Ok(None);
        }
        let mut node = self.store.read(self.root.links[position])?;
        loop {
            match node.search(key) {
                Ok(i) => return Ok(Some(node.entries[i].value.clone())),
                Err(i) => position = i,
            }
            if node.is_leaf {
                return Ok(None);
            }
            node = self.store.read(node.links[position])?;
        }
    }

    /// Inserts `value` under `key`, replacing any previous payload.
    pub fn insert(&mut self, key: TermId, value: Postings) -> LexTreeResult<()> {
        let mut root = mem::replace(&mut self.root, Node::new_leaf(NodeId::ROOT));
        let result = self.insert_at_root(&mut root, key, value);
        self.root = root;
        result
    }

    fn insert_at_root(&mut self, root: &mut Node, key: TermId, value: Postings) -> LexTreeResult<()> {
        if root.count() == self.config.max_keys() {
            // The old root moves aside under a fresh identity; the root
            // token stays with the new one-link top node.
            let demoted_id = self.store.allocate()?;
            let mut demoted = mem::replace(root, Node::new_internal(NodeId::ROOT));
            demoted.id = demoted_id;
            root.links.push(demoted_id);
            self.split_child(root, 0, &mut demoted)?;
            debug!(demoted = %demoted_id, "root split");
        }
        self.insert_non_full(root, key, value)
    }

    /// Inserts into a node known not to be full.
    fn insert_non_full(&mut self, node: &mut Node, key: TermId, value: Postings) -> LexTreeResult<()> {
        match node.search(key) {
            Ok(i) => {
                node.entries[i].value = value;
                self.store.write(node)
            }
            Err(i) if node.is_leaf => {
                node.entries.insert(i, Entry::new(key, value));
                self.store.write(node)
            }
            Err(mut i) => {
                let mut child = self.store.read(node.links[i])?;
                if child.count() == self.config.max_keys() {
                    self.split_child(node, i, &mut child)?;
                    // The promoted separator may be the key itself, or may
                    // shift the descent target one slot right.
                    match key.cmp(&node.entries[i].key) {
                        Ordering::Equal => {
                            node.entries[i].value = value;
                            return self.store.write(node);
                        }
                        Ordering::Greater => {
                            i += 1;
                            child = self.store.read(node.links[i])?;
                        }
                        Ordering::Less => {}
                    }
                }
                self.insert_non_full(&mut child, key, value)
            }
        }
    }

    /// Splits the full `child` at `parent.links[idx]`, promoting its
    /// median entry into `parent`.
    fn split_child(&mut self, parent: &mut Node, idx: usize, child: &mut Node) -> LexTreeResult<()> {
        let t = self.config.min_degree;
        let sibling_id = self.store.allocate()?;
        let mut sibling = if child.is_leaf {
            Node::new_leaf(sibling_id)
        } else {
            Node::new_internal(sibling_id)
        };

        sibling.entries = child.entries.split_off(t);
        if !child.is_leaf {
            sibling.links = child.links.split_off(t);
        }
        let median = child
            .entries
            .pop()
            .ok_or_else(|| LexTreeError::structure("split of an underfull node"))?;

        parent.entries.insert(idx, median);
        parent.links.insert(idx + 1, sibling_id);

        self.store.write(child)?;
        self.store.write(&sibling)?;
        self.store.write(parent)?;
        self.splits += 1;
        Ok(())
    }

    /// Removes `key` if present; absent keys are a no-op.
    pub fn remove(&mut self, key: TermId) -> LexTreeResult<()> {
        let mut root = mem::replace(&mut self.root, Node::new_leaf(NodeId::ROOT));
        let result = self.delete_rec(&mut root, key);
        self.root = root;
        result
    }

    fn delete_rec(&mut self, node: &mut Node, key: TermId) -> LexTreeResult<()> {
        match node.search(key) {
            Ok(pos) if node.is_leaf => {
                // An emptied root stays persisted; an empty root is the
                // valid representation of an empty tree.
                node.entries.remove(pos);
                self.store.write(node)
            }
            Ok(pos) => {
                self.rearrange(node, pos)?;
                match node.search(key) {
                    Ok(pos) => self.delete_from_non_leaf(node, pos, key),
                    Err(pos) => self.descend_and_delete(node, pos, key),
                }
            }
            Err(_) if node.is_leaf => Ok(()),
            Err(pos) => self.descend_and_delete(node, pos, key),
        }
    }

    fn descend_and_delete(&mut self, node: &mut Node, pos: usize, key: TermId) -> LexTreeResult<()> {
        match self.descend_target(node, pos)? {
            Some(mut child) => self.delete_rec(&mut child, key),
            // The root collapsed into `node`; resume from it.
            None => self.delete_rec(node, key),
        }
    }

    /// Rotates the entry at `node.entries[pos]` down into one of its
    /// bordering children ahead of its deletion, provided a donor child has
    /// surplus and the receiver has room. When neither rotation applies the
    /// replacement and merge paths of [`Self::delete_from_non_leaf`] take
    /// over.
    fn rearrange(&mut self, node: &mut Node, pos: usize) -> LexTreeResult<()> {
        let mut pred = self.store.read(node.links[pos])?;
        let mut next = self.store.read(node.links[pos + 1])?;
        if pred.count() >= self.config.min_degree && next.count() < self.config.max_keys() {
            self.rotate_from_left(node, pos + 1, &mut next, &mut pred)
        } else if next.count() >= self.config.min_degree && pred.count() < self.config.max_keys() {
            self.rotate_from_right(node, pos, &mut pred, &mut next)
        } else {
            Ok(())
        }
    }

    /// Deletes the entry at `node.entries[pos]` of an internal node by
    /// predecessor or successor replacement, or by merging its bordering
    /// children when both are minimal.
    fn delete_from_non_leaf(&mut self, node: &mut Node, pos: usize, key: TermId) -> LexTreeResult<()> {
        let mut pred = self.store.read(node.links[pos])?;
        if pred.count() >= self.config.min_degree {
            let replacement = self.subtree_max(&pred)?;
            self.delete_rec(&mut pred, replacement.key)?;
            node.entries[pos] = replacement;
            return self.store.write(node);
        }

        let mut next = self.store.read(node.links[pos + 1])?;
        if next.count() >= self.config.min_degree {
            let replacement = self.subtree_min(&next)?;
            self.delete_rec(&mut next, replacement.key)?;
            node.entries[pos] = replacement;
            return self.store.write(node);
        }

        // Both bordering children are minimal: merge them around the
        // separator, then delete the separator from the merged node.
        match self.merge_children(node, pos)? {
            Some(mut merged) => self.delete_rec(&mut merged, key),
            None => self.delete_rec(node, key),
        }
    }

    /// Prepares the child at `parent.links[pos]` for descent, guaranteeing
    /// it holds at least `t` entries on return.
    ///
    /// Returns `None` when topping the child up collapsed the root; the
    /// merged content then lives in `*parent` and the caller resumes from
    /// it.
    fn descend_target(&mut self, parent: &mut Node, pos: usize) -> LexTreeResult<Option<Node>> {
        let mut child = self.store.read(parent.links[pos])?;
        if child.count() > self.config.min_keys() {
            return Ok(Some(child));
        }

        if pos > 0 {
            let mut left = self.store.read(parent.links[pos - 1])?;
            if left.count() > self.config.min_keys() {
                self.rotate_from_left(parent, pos, &mut child, &mut left)?;
                return Ok(Some(child));
            }
        }
        if pos + 1 < parent.links.len() {
            let mut right = self.store.read(parent.links[pos + 1])?;
            if right.count() > self.config.min_keys() {
                self.rotate_from_right(parent, pos, &mut child, &mut right)?;
                return Ok(Some(child));
            }
        }

        // No sibling can donate; merge toward the left when possible.
        let sep = if pos > 0 { pos - 1 } else { pos };
        self.merge_children(parent, sep)
    }

    /// Moves the last entry of `left` up into the parent separator and the
    /// old separator down to the front of `child`. `child_idx` is the link
    /// index of `child`; the separator sits at `child_idx - 1`.
    fn rotate_from_left(
        &mut self,
        parent: &mut Node,
        child_idx: usize,
        child: &mut Node,
        left: &mut Node,
    ) -> LexTreeResult<()> {
        let sep = child_idx - 1;
        let donated = left
            .entries
            .pop()
            .ok_or_else(|| LexTreeError::structure("rotation from an empty left sibling"))?;
        let sep_entry = mem::replace(&mut parent.entries[sep], donated);
        child.entries.insert(0, sep_entry);
        if !child.is_leaf {
            let link = left
                .links
                .pop()
                .ok_or_else(|| LexTreeError::structure("left sibling has no link to donate"))?;
            child.links.insert(0, link);
        }
        self.store.write(left)?;
        self.store.write(child)?;
        self.store.write(parent)?;
        self.rotations += 1;
        Ok(())
    }

    /// Mirror image of [`Self::rotate_from_left`]: the first entry of
    /// `right` moves up, the separator at `child_idx` moves down to the
    /// back of `child`.
    fn rotate_from_right(
        &mut self,
        parent: &mut Node,
        child_idx: usize,
        child: &mut Node,
        right: &mut Node,
    ) -> LexTreeResult<()> {
        if right.entries.is_empty() {
            return Err(LexTreeError::structure("rotation from an empty right sibling"));
        }
        let donated = right.entries.remove(0);
        let sep_entry = mem::replace(&mut parent.entries[child_idx], donated);
        child.entries.push(sep_entry);
        if !child.is_leaf {
            if right.links.is_empty() {
                return Err(LexTreeError::structure("right sibling has no link to donate"));
            }
            child.links.push(right.links.remove(0));
        }
        self.store.write(right)?;
        self.store.write(child)?;
        self.store.write(parent)?;
        self.rotations += 1;
        Ok(())
    }

    /// Merges `parent.links[sep]`, the separator at `parent.entries[sep]`,
    /// and `parent.links[sep + 1]` into one node.
    ///
    /// Returns the merged node, or `None` when consuming the separator
    /// emptied the root: the merged node then takes over the root identity,
    /// `*parent` is replaced with it, and the freed slots are deleted.
    fn merge_children(&mut self, parent: &mut Node, sep: usize) -> LexTreeResult<Option<Node>> {
        let mut left = self.store.read(parent.links[sep])?;
        let right = self.store.read(parent.links[sep + 1])?;
        let right_id = right.id;

        let sep_entry = parent.entries.remove(sep);
        parent.links.remove(sep + 1);

        left.entries.push(sep_entry);
        left.entries.extend(right.entries);
        left.links.extend(right.links);
        self.merges += 1;

        if parent.id.is_root() && parent.entries.is_empty() {
            let old_id = left.id;
            left.id = NodeId::ROOT;
            self.store.write(&left)?;
            self.store.delete(old_id)?;
            self.store.delete(right_id)?;
            debug!(absorbed = %old_id, "root collapsed");
            *parent = left;
            return Ok(None);
        }

        self.store.write(&left)?;
        self.store.write(parent)?;
        self.store.delete(right_id)?;
        Ok(Some(left))
    }

    /// Largest entry reachable under `node`, found in its rightmost leaf.
    fn subtree_max(&self, node: &Node) -> LexTreeResult<Entry> {
        if node.is_leaf {
            return node
                .entries
                .last()
                .cloned()
                .ok_or_else(|| LexTreeError::structure("max of an empty subtree"));
        }
        let mut id = *node
            .links
            .last()
            .ok_or_else(|| LexTreeError::structure("internal node without links"))?;
        loop {
            let current = self.store.read(id)?;
            if current.is_leaf {
                return current
                    .entries
                    .last()
                    .cloned()
                    .ok_or_else(|| LexTreeError::structure("max of an empty subtree"));
            }
            id = *current
                .links
                .last()
                .ok_or_else(|| LexTreeError::structure("internal node without links"))?;
        }
    }

    /// Smallest entry reachable under `node`, found in its leftmost leaf.
    fn subtree_min(&self, node: &Node) -> LexTreeResult<Entry> {
        if node.is_leaf {
            return node
                .entries
                .first()
                .cloned()
                .ok_or_else(|| LexTreeError::structure("min of an empty subtree"));
        }
        let mut id = *node
            .links
            .first()
            .ok_or_else(|| LexTreeError::structure("internal node without links"))?;
        loop {
            let current = self.store.read(id)?;
            if current.is_leaf {
                return current
                    .entries
                    .first()
                    .cloned()
                    .ok_or_else(|| LexTreeError::structure("min of an empty subtree"));
            }
            id = *current
                .links
                .first()
                .ok_or_else(|| LexTreeError::structure("internal node without links"))?;
        }
    }

    /// Depth of the leaves, counting the root as 1.
    pub fn height(&self) -> LexTreeResult<u32> {
        let mut height = 1;
        let mut node = self.root.clone();
        while !node.is_leaf {
            let first = *node
                .links
                .first()
                .ok_or_else(|| LexTreeError::structure("internal node without links"))?;
            node = self.store.read(first)?;
            height += 1;
        }
        Ok(height)
    }

    /// Walks the whole tree and returns counters plus shape summary.
    pub fn stats(&self) -> LexTreeResult<TreeStats> {
        let mut stats = TreeStats {
            splits: self.splits,
            merges: self.merges,
            rotations: self.rotations,
            ..TreeStats::default()
        };
        self.collect_stats(&self.root, 1, &mut stats)?;
        Ok(stats)
    }

    fn collect_stats(&self, node: &Node, depth: u32, stats: &mut TreeStats) -> LexTreeResult<()> {
        stats.entry_count += node.count() as u64;
        if node.is_leaf {
            stats.leaf_count += 1;
            stats.height = stats.height.max(depth);
            return Ok(());
        }
        stats.internal_count += 1;
        for link in &node.links {
            let child = self.store.read(*link)?;
            self.collect_stats(&child, depth + 1, stats)?;
        }
        Ok(())
    }

    /// Verifies the structural invariants of the whole persisted tree:
    /// strict key ordering within and across nodes, occupancy bounds on
    /// every non-root node, link arity on internal nodes, and uniform leaf
    /// depth.
    pub fn check_invariants(&self) -> LexTreeResult<()> {
        let mut leaf_depth = None;
        self.check_node(&self.root, true, None, None, 1, &mut leaf_depth)
    }

    fn check_node(
        &self,
        node: &Node,
        is_root: bool,
        lower: Option<TermId>,
        upper: Option<TermId>,
        depth: u32,
        leaf_depth: &mut Option<u32>,
    ) -> LexTreeResult<()> {
        if !is_root && node.count() < self.config.min_keys() {
            return Err(LexTreeError::structure(format!(
                "node {} underfull: {} entries",
                node.id,
                node.count()
            )));
        }
        if node.count() > self.config.max_keys() {
            return Err(LexTreeError::structure(format!(
                "node {} overfull: {} entries",
                node.id,
                node.count()
            )));
        }
        if is_root && !node.is_leaf && node.count() == 0 {
            return Err(LexTreeError::structure("internal root without entries"));
        }

        for pair in node.entries.windows(2) {
            if pair[0].key >= pair[1].key {
                return Err(LexTreeError::structure(format!(
                    "node {} keys out of order at {}",
                    node.id, pair[1].key
                )));
            }
        }
        if let (Some(lo), Some(first)) = (lower, node.entries.first()) {
            if first.key <= lo {
                return Err(LexTreeError::structure(format!(
                    "node {} violates lower bound {lo}",
                    node.id
                )));
            }
        }
        if let (Some(hi), Some(last)) = (upper, node.entries.last()) {
            if last.key >= hi {
                return Err(LexTreeError::structure(format!(
                    "node {} violates upper bound {hi}",
                    node.id
                )));
            }
        }

        if node.is_leaf {
            if !node.links.is_empty() {
                return Err(LexTreeError::structure(format!(
                    "leaf {} carries links",
                    node.id
                )));
            }
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(d) if d != depth => {
                    return Err(LexTreeError::structure(format!(
                        "leaf {} at depth {depth}, expected {d}",
                        node.id
                    )))
                }
                Some(_) => {}
            }
            return Ok(());
        }

        if node.links.len() != node.count() + 1 {
            return Err(LexTreeError::structure(format!(
                "node {} has {} entries but {} links",
                node.id,
                node.count(),
                node.links.len()
            )));
        }
        for i in 0..node.links.len() {
            let child = self.store.read(node.links[i])?;
            let lo = if i == 0 { lower } else { Some(node.entries[i - 1].key) };
            let hi = if i == node.count() { upper } else { Some(node.entries[i].key) };
            self.check_node(&child, false, lo, hi, depth + 1, leaf_depth)?;
        }
        Ok(())
    }

    /// In-order key walk, for shape assertions in tests.
    #[cfg(test)]
    pub(crate) fn keys_in_order(&self) -> LexTreeResult<Vec<TermId>> {
        let mut keys = Vec::new();
        self.collect_keys(&self.root, &mut keys)?;
        Ok(keys)
    }

    #[cfg(test)]
    fn collect_keys(&self, node: &Node, keys: &mut Vec<TermId>) -> LexTreeResult<()> {
        if node.is_leaf {
            keys.extend(node.entries.iter().map(|e| e.key));
            return Ok(());
        }
        for i in 0..node.entries.len() {
            let child = self.store.read(node.links[i])?;
            self.collect_keys(&child, keys)?;
            keys.push(node.entries[i].key);
        }
        let last = self.store.read(node.links[node.entries.len()])?;
        self.collect_keys(&last, keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemNodeStore;

    fn test_tree() -> LexTree<MemNodeStore> {
        LexTree::with_store(MemNodeStore::new(), LexTreeConfig::for_testing()).unwrap()
    }

    fn posting(s: &str) -> Postings {
        Postings::from_bytes(s.as_bytes())
    }

    fn node_keys(node: &Node) -> Vec<i64> {
        node.entries.iter().map(|e| e.key.as_i64()).collect()
    }

    #[test]
    fn test_new_tree_is_empty() {
        let tree = test_tree();
        assert!(tree.is_empty());
        assert_eq!(tree.get(TermId::new(1)).unwrap(), None);
        assert_eq!(tree.height().unwrap(), 1);
    }

    #[test]
    fn test_single_insert_get() {
        let mut tree = test_tree();
        tree.insert(TermId::new(42), posting("doc:1")).unwrap();
        assert!(!tree.is_empty());
        assert_eq!(tree.get(TermId::new(42)).unwrap(), Some(posting("doc:1")));
        assert_eq!(tree.get(TermId::new(41)).unwrap(), None);
    }

    #[test]
    fn test_upsert_replaces_value() {
        let mut tree = test_tree();
        tree.insert(TermId::new(7), posting("old")).unwrap();
        tree.insert(TermId::new(7), posting("new")).unwrap();
        assert_eq!(tree.get(TermId::new(7)).unwrap(), Some(posting("new")));

        let stats = tree.stats().unwrap();
        assert_eq!(stats.entry_count, 1);
    }

    #[test]
    fn test_upsert_on_deep_tree() {
        let mut tree = test_tree();
        for k in 0..50 {
            tree.insert(TermId::new(k), posting("v0")).unwrap();
        }
        for k in 0..50 {
            tree.insert(TermId::new(k), posting("v1")).unwrap();
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.stats().unwrap().entry_count, 50);
        for k in 0..50 {
            assert_eq!(tree.get(TermId::new(k)).unwrap(), Some(posting("v1")));
        }
    }

    #[test]
    fn test_textbook_shape_min_degree_two() {
        let mut tree = test_tree();
        for k in [10, 20, 5, 6, 12, 30, 7, 17] {
            tree.insert(TermId::new(k), posting("x")).unwrap();
        }

        assert_eq!(node_keys(&tree.root), vec![10, 20]);
        assert!(!tree.root.is_leaf);
        assert_eq!(tree.root.links.len(), 3);

        let children: Vec<Node> = tree
            .root
            .links
            .iter()
            .map(|id| tree.store.read(*id).unwrap())
            .collect();
        assert_eq!(node_keys(&children[0]), vec![5, 6, 7]);
        assert_eq!(node_keys(&children[1]), vec![12, 17]);
        assert_eq!(node_keys(&children[2]), vec![30]);
        assert!(children.iter().all(|c| c.is_leaf));

        let stats = tree.stats().unwrap();
        assert_eq!(stats.splits, 2);
        assert_eq!(stats.height, 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_even_keys() {
        let mut tree = test_tree();
        for k in 1..=20 {
            tree.insert(TermId::new(k), posting("x")).unwrap();
        }
        for k in (2..=20).step_by(2) {
            tree.remove(TermId::new(k)).unwrap();
            tree.check_invariants().unwrap();
        }

        let odds: Vec<TermId> = (1..=19).step_by(2).map(TermId::new).collect();
        assert_eq!(tree.keys_in_order().unwrap(), odds);
        for k in (2..=20).step_by(2) {
            assert_eq!(tree.get(TermId::new(k)).unwrap(), None);
        }
        for k in (1..=19).step_by(2) {
            assert!(tree.get(TermId::new(k)).unwrap().is_some());
        }
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut tree = test_tree();
        for k in [3, 1, 2] {
            tree.insert(TermId::new(k), posting("x")).unwrap();
        }
        tree.remove(TermId::new(99)).unwrap();
        assert_eq!(
            tree.keys_in_order().unwrap(),
            vec![TermId::new(1), TermId::new(2), TermId::new(3)]
        );
    }

    #[test]
    fn test_remove_from_empty_tree() {
        let mut tree = test_tree();
        tree.remove(TermId::new(1)).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_emptied_root_stays_usable() {
        let mut tree = test_tree();
        tree.insert(TermId::new(5), posting("x")).unwrap();
        tree.remove(TermId::new(5)).unwrap();

        assert!(tree.is_empty());
        assert_eq!(tree.get(TermId::new(5)).unwrap(), None);

        tree.insert(TermId::new(5), posting("y")).unwrap();
        assert_eq!(tree.get(TermId::new(5)).unwrap(), Some(posting("y")));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_root_collapse_shrinks_height() {
        let mut tree = test_tree();
        for k in 1..=8 {
            tree.insert(TermId::new(k), posting("x")).unwrap();
        }
        let grown = tree.height().unwrap();
        assert!(grown >= 2);

        for k in 1..=7 {
            tree.remove(TermId::new(k)).unwrap();
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.height().unwrap(), 1);
        assert_eq!(tree.keys_in_order().unwrap(), vec![TermId::new(8)]);
    }

    #[test]
    fn test_delete_keys_held_in_internal_nodes() {
        let mut tree = test_tree();
        for k in 1..=30 {
            tree.insert(TermId::new(k), posting("x")).unwrap();
        }
        // Remove the keys sitting in the root first.
        let separators = node_keys(&tree.root);
        for k in &separators {
            tree.remove(TermId::new(*k)).unwrap();
            tree.check_invariants().unwrap();
        }
        assert_eq!(
            tree.stats().unwrap().entry_count,
            30 - separators.len() as u64
        );
        for k in separators {
            assert_eq!(tree.get(TermId::new(k)).unwrap(), None);
        }
    }

    #[test]
    fn test_descending_inserts_stay_sorted() {
        let mut tree = test_tree();
        for k in (0..64).rev() {
            tree.insert(TermId::new(k), posting("x")).unwrap();
        }
        let keys: Vec<i64> = tree
            .keys_in_order()
            .unwrap()
            .iter()
            .map(|k| k.as_i64())
            .collect();
        assert_eq!(keys, (0..64).collect::<Vec<_>>());
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_disk_tree_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = LexTreeConfig::for_testing();

        let mut tree = LexTree::open(dir.path(), config.clone()).unwrap();
        for k in 1..=12 {
            tree.insert(TermId::new(k), posting(&format!("doc:{k}"))).unwrap();
        }
        tree.remove(TermId::new(6)).unwrap();
        drop(tree);

        let tree = LexTree::open(dir.path(), config).unwrap();
        tree.check_invariants().unwrap();
        assert_eq!(tree.get(TermId::new(6)).unwrap(), None);
        for k in (1..=12).filter(|k| *k != 6) {
            assert_eq!(tree.get(TermId::new(k)).unwrap(), Some(posting(&format!("doc:{k}"))));
        }
    }

    #[test]
    fn test_emptied_root_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = LexTreeConfig::for_testing();

        let mut tree = LexTree::open(dir.path(), config.clone()).unwrap();
        tree.insert(TermId::new(1), posting("x")).unwrap();
        tree.remove(TermId::new(1)).unwrap();
        drop(tree);

        let mut tree = LexTree::open(dir.path(), config).unwrap();
        assert!(tree.is_empty());
        tree.insert(TermId::new(2), posting("y")).unwrap();
        assert_eq!(tree.get(TermId::new(2)).unwrap(), Some(posting("y")));
    }

    #[test]
    fn test_stats_counts_shape() {
        let mut tree = test_tree();
        for k in 1..=10 {
            tree.insert(TermId::new(k), posting("x")).unwrap();
        }
        let stats = tree.stats().unwrap();
        assert_eq!(stats.entry_count, 10);
        assert!(stats.splits > 0);
        assert_eq!(
            stats.height,
            tree.height().unwrap()
        );
        assert!(stats.leaf_count > stats.internal_count);
    }
}
