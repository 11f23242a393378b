//! BaseFS - a prototype filesystem built around an in-memory B-tree index.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            BaseFS                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/)                        │   │
//! │  │   BTree → NodeArena → Node        (memory-resident)      │   │
//! │  │   TreeDump · IndexStats · SharedBTree                    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                                                                 │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │     Superblock + format_image (mkbasefs)                 │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two layers are independent: the index is not wired into any on-disk
//! structure.
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeId, Error, config)
//! - [`index`] - The B-tree
//! - [`storage`] - Superblock layout and image formatting
//!
//! # Quick Start
//! ```
//! use basefs::BTree;
//!
//! let mut tree = BTree::new().unwrap();
//! tree.insert(10).unwrap();
//! tree.insert(20).unwrap();
//!
//! assert!(tree.search(10));
//! assert!(!tree.search(15));
//! println!("{}", tree.dump());
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{BLOCK_SIZE, MAX_KEYS, MIN_KEYS, ORDER};
pub use common::{Error, NodeId, Result};

pub use index::btree::{
    BTree, BTreeConfig, DumpEntry, IndexStats, NodeKind, SharedBTree, StatsSnapshot, TreeDump,
};
pub use storage::{format_image, read_superblock, ImageSummary, Superblock};
