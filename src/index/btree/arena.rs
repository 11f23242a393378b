//! Node arena - owns every node of one B-tree.
//!
//! Nodes are stored in a single `Vec<Node>` and addressed by [`NodeId`].
//! Released slots go on a free list and are reused before the vector grows.

use std::sync::Arc;

use tracing::warn;

use super::node::Node;
use super::stats::IndexStats;
use crate::common::{Error, NodeId, Result};

/// Backing store for the nodes of a single tree.
///
/// # Layout
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │ nodes:     [Node0] [Node1] [Node2] ...       │
/// │ free_list: [NodeId, ...]   (released slots)  │
/// └──────────────────────────────────────────────┘
/// ```
///
/// Allocation is the only failable step of any index operation. Callers
/// that must not fail halfway call [`NodeArena::reserve`] first: once it
/// succeeds, that many subsequent [`NodeArena::allocate`] calls cannot fail.
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,

    /// Stack of released slots (LIFO).
    free_list: Vec<NodeId>,

    /// Nodes currently handed out.
    live: usize,

    /// Upper bound on live nodes, if any.
    max_nodes: Option<usize>,

    stats: Arc<IndexStats>,
}

impl NodeArena {
    /// Create an empty arena.
    pub fn new(max_nodes: Option<usize>, stats: Arc<IndexStats>) -> Self {
        Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            max_nodes,
            stats,
        }
    }

    /// Make sure the next `additional` allocations will succeed.
    ///
    /// # Errors
    /// `Error::AllocationFailure` if the node budget would be exceeded or the
    /// backing vector cannot grow. Nothing is allocated in that case.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        if additional == 0 {
            return Ok(());
        }

        let over_budget = self
            .max_nodes
            .is_some_and(|max| self.live.saturating_add(additional) > max);

        let fresh = additional.saturating_sub(self.free_list.len());
        let over_ids = self.nodes.len().saturating_add(fresh) >= NodeId::INVALID.index();

        if over_budget || over_ids || self.nodes.try_reserve(fresh).is_err() {
            IndexStats::bump(&self.stats.allocation_failures);
            warn!(
                requested = additional,
                live = self.live,
                max_nodes = ?self.max_nodes,
                "B-tree node allocation refused"
            );
            return Err(Error::AllocationFailure {
                requested: additional,
            });
        }

        Ok(())
    }

    /// Store `node` in a free slot and return its id.
    ///
    /// # Errors
    /// `Error::AllocationFailure` if no slot can be obtained.
    pub fn allocate(&mut self, node: Node) -> Result<NodeId> {
        self.reserve(1)?;

        let node_id = match self.free_list.pop() {
            Some(node_id) => {
                self.nodes[node_id.index()] = node;
                node_id
            }
            None => {
                // reserve() keeps the length below NodeId::INVALID
                let node_id = NodeId::new(self.nodes.len() as u32);
                self.nodes.push(node);
                node_id
            }
        };

        self.live += 1;
        IndexStats::bump(&self.stats.nodes_allocated);
        Ok(node_id)
    }

    /// Return a node's slot to the free list.
    ///
    /// The caller must have released (or moved) the node's children first.
    pub fn release(&mut self, node_id: NodeId) {
        self.nodes[node_id.index()] = Node::default();
        self.free_list.push(node_id);
        self.live -= 1;
        IndexStats::bump(&self.stats.nodes_freed);
    }

    /// Drop all backing storage. Every node must already be released.
    pub fn clear(&mut self) {
        debug_assert_eq!(self.live, 0, "clearing arena with live nodes");
        self.nodes = Vec::new();
        self.free_list = Vec::new();
    }

    #[inline]
    pub fn get(&self, node_id: NodeId) -> &Node {
        &self.nodes[node_id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, node_id: NodeId) -> &mut Node {
        &mut self.nodes[node_id.index()]
    }

    /// Number of nodes currently handed out.
    #[inline]
    pub fn live_nodes(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn max_nodes(&self) -> Option<usize> {
        self.max_nodes
    }
}
