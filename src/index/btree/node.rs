//! B-tree node - fixed-capacity key and child arrays.
//!
//! A [`Node`] is a plain value: it never allocates, and the only way its
//! arrays change is through the checked mutators below. Children are
//! [`NodeId`]s into the owning tree's arena.

use crate::common::config::{MAX_KEYS, ORDER};
use crate::common::{Error, NodeId, Result};

/// A single B-tree node, either a leaf or an internal (routing) node.
///
/// # Layout
/// ```text
/// keys:     [ k0 | k1 | k2 ]           (num_keys in use)
/// children: [ c0 | c1 | c2 | c3 ]      (num_keys + 1 in use, internal only)
/// ```
///
/// `children[i]` holds keys in `[keys[i-1], keys[i])`, with open ends at the
/// first and last slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    is_leaf: bool,
    num_keys: usize,
    keys: [u64; MAX_KEYS],
    children: [NodeId; ORDER],
}

impl Node {
    /// Create an empty node.
    pub fn new(is_leaf: bool) -> Self {
        Self {
            is_leaf,
            num_keys: 0,
            keys: [0; MAX_KEYS],
            children: [NodeId::INVALID; ORDER],
        }
    }

    /// Create an empty leaf.
    #[inline]
    pub fn new_leaf() -> Self {
        Self::new(true)
    }

    /// Create an internal node with no keys whose only child is `child`.
    ///
    /// This is the shape of a fresh root during height growth, right before
    /// its child is split.
    pub fn new_root_above(child: NodeId) -> Self {
        let mut node = Self::new(false);
        node.children[0] = child;
        node
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Number of keys in use.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_keys
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_keys == 0
    }

    /// True when no more keys fit.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.num_keys == MAX_KEYS
    }

    /// Keys in use, in ascending order.
    #[inline]
    pub fn keys(&self) -> &[u64] {
        &self.keys[..self.num_keys]
    }

    #[inline]
    pub fn key(&self, index: usize) -> u64 {
        self.keys()[index]
    }

    /// Child slots in use. Empty for leaves.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        if self.is_leaf {
            &[]
        } else {
            &self.children[..self.num_keys + 1]
        }
    }

    #[inline]
    pub fn child(&self, index: usize) -> NodeId {
        self.children()[index]
    }

    /// Left-to-right scan used by search.
    ///
    /// Returns `Ok(i)` when `keys[i] == key`, otherwise `Err(slot)` where
    /// `slot` is the position of the first key strictly greater than `key`.
    pub fn locate(&self, key: u64) -> std::result::Result<usize, usize> {
        for (i, &k) in self.keys().iter().enumerate() {
            if key < k {
                return Err(i);
            }
            if key == k {
                return Ok(i);
            }
        }
        Err(self.num_keys)
    }

    /// Child slot an insert of `key` descends into.
    ///
    /// Scans right-to-left while `key` is below the current key, so keys equal
    /// to a separator route to the right of it.
    pub fn route(&self, key: u64) -> usize {
        let mut i = self.num_keys;
        while i >= 1 && key < self.keys[i - 1] {
            i -= 1;
        }
        i
    }

    /// Insert `key` into a leaf at its sorted position.
    ///
    /// # Errors
    /// `Error::NodeOverflow` if the leaf is already full.
    pub fn insert_key(&mut self, key: u64) -> Result<()> {
        if !self.is_leaf {
            return Err(Error::InvariantViolation(
                "direct key insert into an internal node".to_string(),
            ));
        }
        if self.is_full() {
            return Err(Error::NodeOverflow { capacity: MAX_KEYS });
        }

        let mut i = self.num_keys;
        while i >= 1 && key < self.keys[i - 1] {
            self.keys[i] = self.keys[i - 1];
            i -= 1;
        }
        self.keys[i] = key;
        self.num_keys += 1;
        Ok(())
    }

    /// Move the upper half of a full node into a new node.
    ///
    /// With `mid = MAX_KEYS / 2`, this node keeps `keys[..mid]` (and
    /// `children[..=mid]`), the returned sibling takes `keys[mid+1..]` (and
    /// `children[mid+1..]`), and `keys[mid]` is handed back as the median.
    ///
    /// # Errors
    /// `Error::InvariantViolation` if the node is not full.
    pub fn split_upper(&mut self) -> Result<(u64, Node)> {
        if !self.is_full() {
            return Err(Error::InvariantViolation(format!(
                "split of a node holding {} of {} keys",
                self.num_keys, MAX_KEYS
            )));
        }

        let mid = MAX_KEYS / 2;
        let moved = MAX_KEYS - mid - 1;

        let mut upper = Node::new(self.is_leaf);
        upper.keys[..moved].copy_from_slice(&self.keys[mid + 1..]);
        upper.num_keys = moved;

        if !self.is_leaf {
            upper.children[..=moved].copy_from_slice(&self.children[mid + 1..]);
            self.children[mid + 1..].fill(NodeId::INVALID);
        }

        let median = self.keys[mid];
        self.keys[mid..].fill(0);
        self.num_keys = mid;

        Ok((median, upper))
    }

    /// Insert a separator key at `index` with `right` as the child after it.
    ///
    /// Keys at `index..` and children at `index+1..` shift right by one.
    ///
    /// # Errors
    /// `Error::NodeOverflow` if the node is full.
    pub fn insert_separator(&mut self, index: usize, key: u64, right: NodeId) -> Result<()> {
        if self.is_leaf {
            return Err(Error::InvariantViolation(
                "separator insert into a leaf".to_string(),
            ));
        }
        if self.is_full() {
            return Err(Error::NodeOverflow { capacity: MAX_KEYS });
        }
        if index > self.num_keys {
            return Err(Error::InvariantViolation(format!(
                "separator index {} past {} keys",
                index, self.num_keys
            )));
        }

        let n = self.num_keys;
        self.keys.copy_within(index..n, index + 1);
        self.children.copy_within(index + 1..n + 1, index + 2);
        self.keys[index] = key;
        self.children[index + 1] = right;
        self.num_keys += 1;
        Ok(())
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new_leaf()
    }
}
