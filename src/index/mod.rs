//! Index structures.
//!
//! - [`btree`] - In-memory B-tree over `u64` keys

pub mod btree;
