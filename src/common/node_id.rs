//! Node identifier type.

use std::fmt;

/// Identifies a node inside a B-tree's arena.
///
/// `u32` keeps child slot arrays small; an arena never holds more than
/// `u32::MAX - 1` nodes.
///
/// # Example
/// ```
/// use basefs::NodeId;
///
/// let node_id = NodeId::new(7);
/// assert!(node_id.is_valid());
/// assert_eq!(node_id.index(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Invalid/sentinel node ID.
    ///
    /// Marks unused child slots and the root of a destroyed tree.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    /// Create a new NodeId.
    #[inline]
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// Check if this node ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Position of this node in the arena's backing vector.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Node(INVALID)")
        } else {
            write!(f, "Node({})", self.0)
        }
    }
}
