//! Error types for BaseFS.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in BaseFS.
///
/// Index errors and storage errors share one enum so callers only match on a
/// single type.
#[derive(Debug, Error)]
pub enum Error {
    /// A node could not be allocated.
    ///
    /// Either the allocator refused to grow the arena or the configured node
    /// budget is exhausted. The tree is left exactly as it was.
    #[error("Failed to allocate {requested} B-tree node(s)")]
    AllocationFailure { requested: usize },

    /// A node mutation would have exceeded the node's key capacity.
    ///
    /// This indicates a bug - inserts always split full nodes first.
    #[error("Node overflow: capacity is {capacity} keys")]
    NodeOverflow { capacity: usize },

    /// The tree was destroyed and can no longer accept keys.
    #[error("B-tree has been destroyed")]
    TreeDestroyed,

    /// A structural check found a broken invariant.
    #[error("B-tree invariant violated: {0}")]
    InvariantViolation(String),

    /// I/O error from image operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The superblock does not carry the BaseFS magic number.
    #[error("Bad superblock magic: {0:#010x}")]
    BadMagic(u32),

    /// Fewer bytes than a full superblock were available.
    #[error("Superblock truncated: got {0} bytes")]
    TruncatedSuperblock(usize),

    /// The requested image size does not fit in a u64 byte count.
    #[error("Image of {blocks} blocks is too large")]
    ImageTooLarge { blocks: u64 },
}
