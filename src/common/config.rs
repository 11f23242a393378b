//! Configuration constants for BaseFS.

/// Maximum number of children an internal B-tree node may have.
pub const ORDER: usize = 4;

/// Maximum number of keys held by a single node.
pub const MAX_KEYS: usize = ORDER - 1;

/// Minimum number of keys a non-root node holds after a split.
///
/// Splits always leave both halves at or above this; nothing else enforces
/// it because keys are never removed.
pub const MIN_KEYS: usize = MAX_KEYS / 2;

/// Magic number stored at offset 0 of every image ("base" in ASCII).
pub const BASEFS_MAGIC: u32 = 0x6261_7365;

/// Size of a block in a BaseFS image, in bytes.
///
/// The image formatter lays images out in 4KB blocks. Every block count on
/// disk is expressed in units of this size.
pub const BLOCK_SIZE: u64 = 4096;

/// Theoretical maximum file size: 1 PB = 2^50 bytes.
pub const MAX_FILESIZE: u64 = 1 << 50;
