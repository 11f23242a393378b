//! B-tree index - an in-memory ordered set of `u64` keys.
//!
//! # Components
//! - [`BTree`] - The tree handle: create, search, insert, destroy, dump
//! - [`Node`] - Fixed-capacity node (`MAX_KEYS` keys, `ORDER` children)
//! - [`NodeArena`] - Per-tree node storage addressed by [`NodeId`](crate::NodeId)
//! - [`TreeDump`] - Structured pre-order dump
//! - [`IndexStats`] - Allocation and operation counters
//! - [`SharedBTree`] - Mutex-protected handle for cross-thread use

mod arena;
mod dump;
mod node;
mod shared;
mod stats;
mod tree;

pub use arena::NodeArena;
pub use dump::{DumpEntry, NodeKind, TreeDump};
pub use node::Node;
pub use shared::SharedBTree;
pub use stats::{IndexStats, StatsSnapshot};
pub use tree::{BTree, BTreeConfig};
