//! The B-tree handle: create, search, insert, destroy.

use std::sync::Arc;

use tracing::{debug, trace};

use super::arena::NodeArena;
use super::dump::{DumpEntry, NodeKind, TreeDump};
use super::node::Node;
use super::stats::IndexStats;
use crate::common::config::{MAX_KEYS, MIN_KEYS};
use crate::common::{Error, NodeId, Result};

/// Runtime settings for a [`BTree`].
///
/// # Example
/// ```
/// use basefs::{BTree, BTreeConfig};
///
/// let tree = BTree::with_config(BTreeConfig::default().with_max_nodes(64)).unwrap();
/// assert_eq!(tree.config().max_nodes, Some(64));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BTreeConfig {
    /// Upper bound on live nodes. `None` means limited only by memory.
    pub max_nodes: Option<usize>,
}

impl BTreeConfig {
    /// Cap the number of live nodes the tree may hold.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }
}

/// An in-memory B-tree of `u64` keys.
///
/// Keys and child links live in every node, internal ones included; there
/// is no leaf chaining and no value storage. Duplicate keys are accepted.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │ BTree                                            │
/// │   root ──────────────┐                           │
/// │   ┌──────────────────▼───────────────────────┐   │
/// │   │ NodeArena: [Node] [Node] [Node] ...      │   │
/// │   └──────────────────────────────────────────┘   │
/// │   stats: Arc<IndexStats>                         │
/// └──────────────────────────────────────────────────┘
/// ```
///
/// Every node is owned by exactly one parent (the root by the tree) and
/// reachable only through it.
///
/// # Failure
/// Allocation is the only step that can fail. `insert` reserves every node it
/// will need before touching the tree, so a failed insert leaves the tree
/// exactly as it was.
///
/// # Thread Safety
/// `BTree` is single-threaded: mutation takes `&mut self`. Wrap it in a
/// [`SharedBTree`](super::SharedBTree) to share it across threads.
///
/// # Example
/// ```
/// use basefs::BTree;
///
/// let mut tree = BTree::new().unwrap();
/// for key in [10, 20, 30, 40] {
///     tree.insert(key).unwrap();
/// }
/// assert!(tree.search(20));
/// assert!(!tree.search(25));
/// assert_eq!(tree.height(), 2);
/// ```
#[derive(Debug)]
pub struct BTree {
    arena: NodeArena,

    /// `NodeId::INVALID` once the tree is destroyed.
    root: NodeId,

    /// Keys inserted, duplicates included.
    len: usize,

    config: BTreeConfig,
    stats: Arc<IndexStats>,
}

impl BTree {
    /// Create an empty tree with default settings.
    ///
    /// # Errors
    /// `Error::AllocationFailure` if the root node cannot be allocated.
    pub fn new() -> Result<Self> {
        Self::with_config(BTreeConfig::default())
    }

    /// Create an empty tree: a single leaf root with no keys.
    ///
    /// # Errors
    /// `Error::AllocationFailure` if the root node cannot be allocated. No
    /// tree exists in that case.
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        let stats = Arc::new(IndexStats::new());
        let mut arena = NodeArena::new(config.max_nodes, Arc::clone(&stats));
        let root = arena.allocate(Node::new_leaf())?;

        Ok(Self {
            arena,
            root,
            len: 0,
            config,
            stats,
        })
    }

    // ========================================================================
    // Public API: search and insert
    // ========================================================================

    /// Check whether `key` was inserted.
    ///
    /// Descends from the root, scanning each node left-to-right. Never
    /// fails and never changes the tree; a destroyed tree contains nothing.
    pub fn search(&self, key: u64) -> bool {
        IndexStats::bump(&self.stats.searches);

        if !self.root.is_valid() {
            return false;
        }

        let mut node = self.arena.get(self.root);
        loop {
            match node.locate(key) {
                Ok(_) => return true,
                Err(_) if node.is_leaf() => return false,
                Err(slot) => node = self.arena.get(node.child(slot)),
            }
        }
    }

    /// Insert `key`, splitting full nodes on the way down.
    ///
    /// If the root is full the tree grows by one level first.
    ///
    /// # Errors
    /// - `Error::AllocationFailure` if the nodes this insert needs cannot be
    ///   obtained. The tree is unchanged.
    /// - `Error::TreeDestroyed` if the tree was destroyed.
    pub fn insert(&mut self, key: u64) -> Result<()> {
        if !self.root.is_valid() {
            return Err(Error::TreeDestroyed);
        }

        let needed = self.nodes_needed_for(key);
        self.arena.reserve(needed)?;

        let root = self.root;
        if self.arena.get(root).is_full() {
            let new_root = self.arena.allocate(Node::new_root_above(root))?;
            self.split_child(new_root, 0)?;
            self.root = new_root;

            IndexStats::bump(&self.stats.height_growths);
            debug!(height = self.height(), "B-tree grew a new root");

            self.insert_non_full(new_root, key)?;
        } else {
            self.insert_non_full(root, key)?;
        }

        self.len += 1;
        IndexStats::bump(&self.stats.inserts);
        Ok(())
    }

    /// Number of nodes an insert of `key` will allocate.
    ///
    /// Each full node on the routing path is split exactly once, and a full
    /// root additionally needs a new root above it. Splitting never changes
    /// which grandchild a key routes to, so walking the unsplit tree gives
    /// the exact count.
    fn nodes_needed_for(&self, key: u64) -> usize {
        let mut needed = 0;
        let mut node_id = self.root;

        if self.arena.get(node_id).is_full() {
            needed += 1;
        }

        loop {
            let node = self.arena.get(node_id);
            if node.is_full() {
                needed += 1;
            }
            if node.is_leaf() {
                return needed;
            }
            node_id = node.child(node.route(key));
        }
    }

    /// Insert into a node known to have room.
    fn insert_non_full(&mut self, node_id: NodeId, key: u64) -> Result<()> {
        let node = self.arena.get(node_id);
        if node.is_leaf() {
            return self.arena.get_mut(node_id).insert_key(key);
        }

        let mut slot = node.route(key);
        let child = node.child(slot);

        if self.arena.get(child).is_full() {
            self.split_child(node_id, slot)?;
            if self.arena.get(node_id).key(slot) <= key {
                slot += 1;
            }
        }

        let child = self.arena.get(node_id).child(slot);
        self.insert_non_full(child, key)
    }

    /// Split the full child at `index` of `parent`, promoting its median.
    ///
    /// The sibling is allocated before anything moves, so a failure leaves
    /// both nodes untouched.
    fn split_child(&mut self, parent: NodeId, index: usize) -> Result<()> {
        let parent_node = self.arena.get(parent);
        if parent_node.is_full() {
            return Err(Error::NodeOverflow { capacity: MAX_KEYS });
        }

        let full = parent_node.child(index);
        let full_node = self.arena.get(full);
        if !full_node.is_full() {
            return Err(Error::InvariantViolation(format!(
                "split of {} holding {} keys",
                full,
                full_node.len()
            )));
        }

        let is_leaf = full_node.is_leaf();

        let sibling = self.arena.allocate(Node::new(is_leaf))?;
        let (median, upper) = self.arena.get_mut(full).split_upper()?;
        *self.arena.get_mut(sibling) = upper;
        self.arena
            .get_mut(parent)
            .insert_separator(index, median, sibling)?;

        IndexStats::bump(&self.stats.splits);
        trace!(%parent, index, median, %sibling, "split B-tree node");
        Ok(())
    }

    // ========================================================================
    // Public API: destroy
    // ========================================================================

    /// Release every node, children before parents.
    ///
    /// Returns the number of nodes released. The handle is left destroyed:
    /// searches return false and inserts fail. Destroying again is a no-op
    /// that returns 0.
    pub fn destroy(&mut self) -> usize {
        if !self.root.is_valid() {
            return 0;
        }

        let released = self.release_subtree(self.root);
        self.root = NodeId::INVALID;
        self.len = 0;
        self.arena.clear();

        debug!(released, "B-tree destroyed");
        released
    }

    fn release_subtree(&mut self, node_id: NodeId) -> usize {
        let node = *self.arena.get(node_id);

        let mut released = 0;
        for &child in node.children() {
            released += self.release_subtree(child);
        }

        self.arena.release(node_id);
        released + 1
    }

    /// True once [`destroy`](Self::destroy) has run.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        !self.root.is_valid()
    }

    // ========================================================================
    // Public API: inspection
    // ========================================================================

    /// Number of keys inserted, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels; 1 for a lone root, 0 once destroyed.
    pub fn height(&self) -> usize {
        if !self.root.is_valid() {
            return 0;
        }

        let mut height = 1;
        let mut node = self.arena.get(self.root);
        while !node.is_leaf() {
            node = self.arena.get(node.child(0));
            height += 1;
        }
        height
    }

    /// Number of live nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.arena.live_nodes()
    }

    /// Keys held by the root node.
    pub fn root_keys(&self) -> Vec<u64> {
        if !self.root.is_valid() {
            return Vec::new();
        }
        self.arena.get(self.root).keys().to_vec()
    }

    /// All keys in ascending order (in-order traversal).
    pub fn keys(&self) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.len);
        if self.root.is_valid() {
            self.collect_in_order(self.root, &mut out);
        }
        out
    }

    fn collect_in_order(&self, node_id: NodeId, out: &mut Vec<u64>) {
        let node = self.arena.get(node_id);
        if node.is_leaf() {
            out.extend_from_slice(node.keys());
            return;
        }

        for (i, &child) in node.children().iter().enumerate() {
            self.collect_in_order(child, out);
            if i < node.len() {
                out.push(node.key(i));
            }
        }
    }

    #[inline]
    pub fn config(&self) -> BTreeConfig {
        self.config
    }

    /// Shared statistics; they stay readable after the tree is dropped.
    pub fn stats(&self) -> Arc<IndexStats> {
        Arc::clone(&self.stats)
    }

    // ========================================================================
    // Public API: diagnostics
    // ========================================================================

    /// Pre-order dump of every node.
    pub fn dump(&self) -> TreeDump {
        let mut entries = Vec::with_capacity(self.arena.live_nodes());
        if self.root.is_valid() {
            self.dump_node(self.root, 0, &mut entries);
        }
        TreeDump::new(entries)
    }

    fn dump_node(&self, node_id: NodeId, depth: usize, entries: &mut Vec<DumpEntry>) {
        let node = self.arena.get(node_id);
        entries.push(DumpEntry {
            depth,
            kind: if node.is_leaf() {
                NodeKind::Leaf
            } else {
                NodeKind::Internal
            },
            keys: node.keys().to_vec(),
        });

        for &child in node.children() {
            self.dump_node(child, depth + 1, entries);
        }
    }

    /// Write the rendered dump to the `tracing` debug log, one line per event.
    pub fn log_dump(&self) {
        for line in self.dump().to_string().lines() {
            debug!("{}", line);
        }
    }

    /// CRC32 of the tree's shape and contents.
    pub fn structure_checksum(&self) -> u32 {
        self.dump().checksum()
    }

    /// Walk the whole tree and verify its structural invariants.
    ///
    /// Checks key order inside nodes and against separators, occupancy
    /// (`MIN_KEYS..=MAX_KEYS` off the root, at least one key in an internal
    /// root), uniform leaf depth, and that the node and key counts agree
    /// with the arena and `len()`. Keys equal to a separator may sit on
    /// either side of it when duplicates were inserted.
    ///
    /// # Errors
    /// `Error::InvariantViolation` describing the first problem found.
    pub fn check_invariants(&self) -> Result<()> {
        if !self.root.is_valid() {
            return Ok(());
        }

        let mut walk = InvariantWalk::default();
        let keys = self.check_node(self.root, 0, None, None, &mut walk)?;

        if keys != self.len {
            return Err(Error::InvariantViolation(format!(
                "tree holds {} keys but {} were inserted",
                keys, self.len
            )));
        }
        if walk.nodes != self.arena.live_nodes() {
            return Err(Error::InvariantViolation(format!(
                "{} nodes reachable but {} allocated",
                walk.nodes,
                self.arena.live_nodes()
            )));
        }
        Ok(())
    }

    fn check_node(
        &self,
        node_id: NodeId,
        depth: usize,
        lower: Option<u64>,
        upper: Option<u64>,
        walk: &mut InvariantWalk,
    ) -> Result<usize> {
        let node = self.arena.get(node_id);
        let keys = node.keys();
        walk.nodes += 1;

        let violation =
            |msg: String| Err(Error::InvariantViolation(format!("{}: {}", node_id, msg)));

        if node_id == self.root {
            if !node.is_leaf() && node.is_empty() {
                return violation("internal root has no keys".to_string());
            }
        } else if keys.len() < MIN_KEYS {
            return violation(format!("{} keys, minimum is {}", keys.len(), MIN_KEYS));
        }

        if keys.windows(2).any(|w| w[0] > w[1]) {
            return violation(format!("keys out of order: {:?}", keys));
        }

        let below = lower.is_some_and(|lo| keys.iter().any(|&k| k < lo));
        let above = upper.is_some_and(|hi| keys.iter().any(|&k| k > hi));
        if below || above {
            return violation(format!(
                "keys {:?} outside separator range {:?}..{:?}",
                keys, lower, upper
            ));
        }

        if node.is_leaf() {
            match walk.leaf_depth {
                None => walk.leaf_depth = Some(depth),
                Some(d) if d != depth => {
                    return violation(format!("leaf at depth {} but others at {}", depth, d));
                }
                Some(_) => {}
            }
            return Ok(keys.len());
        }

        let mut total = keys.len();
        for (i, &child) in node.children().iter().enumerate() {
            if !child.is_valid() {
                return violation(format!("child slot {} is empty", i));
            }
            let lo = if i == 0 { lower } else { Some(keys[i - 1]) };
            let hi = if i == keys.len() { upper } else { Some(keys[i]) };
            total += self.check_node(child, depth + 1, lo, hi, walk)?;
        }
        Ok(total)
    }
}

#[derive(Default)]
struct InvariantWalk {
    nodes: usize,
    leaf_depth: Option<usize>,
}

impl Drop for BTree {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(keys: &[u64]) -> BTree {
        let mut tree = BTree::new().unwrap();
        for &k in keys {
            tree.insert(k).unwrap();
        }
        tree
    }

    fn shape(tree: &BTree) -> Vec<(usize, Vec<u64>)> {
        tree.dump()
            .iter()
            .map(|e| (e.depth, e.keys.clone()))
            .collect()
    }

    #[test]
    fn test_new_tree_is_single_empty_leaf() {
        let tree = BTree::new().unwrap();
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.is_empty());
        assert!(!tree.search(0));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_create_fails_with_zero_budget() {
        let err = BTree::with_config(BTreeConfig::default().with_max_nodes(0)).unwrap_err();
        assert!(matches!(err, Error::AllocationFailure { requested: 1 }));
    }

    #[test]
    fn test_three_keys_fill_root_leaf() {
        let tree = tree_with(&[10, 20, 30]);
        assert_eq!(shape(&tree), vec![(0, vec![10, 20, 30])]);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_fourth_key_splits_root() {
        let tree = tree_with(&[10, 20, 30, 40]);

        assert_eq!(
            shape(&tree),
            vec![(0, vec![20]), (1, vec![10]), (1, vec![30, 40])]
        );
        assert_eq!(tree.height(), 2);
        assert!(tree.search(20));
        assert!(!tree.search(25));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_split_promotes_median_into_parent() {
        // [20] / [10] [30 40 50] -> inserting 60 splits the right leaf
        let tree = tree_with(&[10, 20, 30, 40, 50, 60]);

        assert_eq!(
            shape(&tree),
            vec![(0, vec![20, 40]), (1, vec![10]), (1, vec![30]), (1, vec![50, 60])]
        );
        assert_eq!(tree.stats().snapshot().splits, 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_key_equal_to_median_goes_right() {
        let mut tree = tree_with(&[10, 20, 30]);
        tree.insert(20).unwrap();

        assert_eq!(
            shape(&tree),
            vec![(0, vec![20]), (1, vec![10]), (1, vec![20, 30])]
        );
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_height_grows_to_three() {
        let keys: Vec<u64> = (1..=10).collect();
        let tree = tree_with(&keys);

        assert_eq!(tree.height(), 3);
        assert_eq!(tree.stats().snapshot().height_growths, 2);
        assert_eq!(tree.keys(), keys);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_descending_inserts() {
        let keys: Vec<u64> = (1..=50).rev().collect();
        let tree = tree_with(&keys);

        for k in 1..=50 {
            assert!(tree.search(k));
        }
        assert!(!tree.search(0));
        assert!(!tree.search(51));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut tree = tree_with(&[7]);
        tree.insert(7).unwrap();

        assert!(tree.search(7));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.keys(), vec![7, 7]);
    }

    #[test]
    fn test_search_does_not_change_structure() {
        let tree = tree_with(&[5, 1, 9, 3, 7, 2, 8]);
        let before = tree.structure_checksum();

        for k in 0..12 {
            tree.search(k);
        }

        assert_eq!(tree.structure_checksum(), before);
        assert_eq!(tree.stats().snapshot().searches, 12);
    }

    #[test]
    fn test_nodes_needed_counts_split_path() {
        let tree = tree_with(&[10, 20, 30]);
        // full root leaf: new root + sibling
        assert_eq!(tree.nodes_needed_for(40), 2);

        let tree = tree_with(&[10, 20, 30, 40]);
        assert_eq!(tree.nodes_needed_for(5), 0);
        assert_eq!(tree.nodes_needed_for(50), 0);

        let tree = tree_with(&[10, 20, 30, 40, 50]);
        assert_eq!(tree.nodes_needed_for(60), 1);
        assert_eq!(tree.nodes_needed_for(5), 0);
    }

    #[test]
    fn test_failed_height_growth_leaves_tree_unchanged() {
        let mut tree =
            BTree::with_config(BTreeConfig::default().with_max_nodes(2)).unwrap();
        for k in [10, 20, 30] {
            tree.insert(k).unwrap();
        }
        let before = tree.structure_checksum();

        let err = tree.insert(40).unwrap_err();

        assert!(matches!(err, Error::AllocationFailure { requested: 2 }));
        assert_eq!(tree.structure_checksum(), before);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node_count(), 1);
        assert!(!tree.search(40));
    }

    #[test]
    fn test_failed_split_leaves_tree_unchanged() {
        let mut tree =
            BTree::with_config(BTreeConfig::default().with_max_nodes(3)).unwrap();
        for k in [10, 20, 30, 40, 50] {
            tree.insert(k).unwrap();
        }
        assert_eq!(tree.node_count(), 3);
        let before = tree.structure_checksum();

        // right leaf [30 40 50] is full and the budget is spent
        let err = tree.insert(60).unwrap_err();
        assert!(matches!(err, Error::AllocationFailure { .. }));
        assert_eq!(tree.structure_checksum(), before);

        // the left leaf still has room
        tree.insert(5).unwrap();
        assert!(tree.search(5));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut tree = tree_with(&(0..100).collect::<Vec<_>>());
        let stats = tree.stats();
        let nodes = tree.node_count();

        assert_eq!(tree.destroy(), nodes);
        assert!(tree.is_destroyed());
        assert_eq!(tree.node_count(), 0);
        assert_eq!(stats.snapshot().live_nodes(), 0);
    }

    #[test]
    fn test_destroy_twice_is_noop() {
        let mut tree = tree_with(&[1, 2, 3]);
        assert_eq!(tree.destroy(), 1);
        assert_eq!(tree.destroy(), 0);
    }

    #[test]
    fn test_destroyed_tree_rejects_inserts() {
        let mut tree = tree_with(&[1]);
        tree.destroy();

        assert!(!tree.search(1));
        assert!(matches!(tree.insert(2), Err(Error::TreeDestroyed)));
        assert_eq!(tree.height(), 0);
        assert!(tree.dump().is_empty());
        assert!(tree.root_keys().is_empty());
    }

    #[test]
    fn test_drop_releases_nodes() {
        let stats = {
            let tree = tree_with(&(0..40).collect::<Vec<_>>());
            tree.stats()
        };
        let snapshot = stats.snapshot();
        assert!(snapshot.nodes_allocated > 1);
        assert_eq!(snapshot.nodes_allocated, snapshot.nodes_freed);
    }
}
