//! Image formatter - sizes a BaseFS image and writes its superblock.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::common::config::BLOCK_SIZE;
use crate::common::{Error, Result};
use crate::storage::superblock::Superblock;

/// Outcome of [`format_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub path: PathBuf,
    pub blocks_count: u64,
    /// Image size in bytes (`blocks_count × BLOCK_SIZE`).
    pub total_bytes: u64,
}

impl fmt::Display for ImageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Created BaseFS image '{}' with {} blocks ({} bytes total).",
            self.path.display(),
            self.blocks_count,
            self.total_bytes
        )
    }
}

/// Create (or reuse) an image file of `blocks_count` blocks and write a
/// fresh superblock at offset 0.
///
/// # File Layout
/// ```text
/// ┌────────────────────────┬─────────┬─────────┬─────────┐
/// │ Block 0                │ Block 1 │  ...    │ Block N │
/// │ [Superblock | zeros]   │ (4KB)   │         │ (4KB)   │
/// └────────────────────────┴─────────┴─────────┴─────────┘
/// ```
///
/// An existing file is resized to exactly the new length; bytes past the
/// superblock that survive the resize are left as they were.
///
/// # Durability
/// The file is `fsync`ed before returning.
///
/// # Errors
/// - `Error::ImageTooLarge` if the byte size overflows a `u64`
/// - `Error::Io` on any file operation failure
pub fn format_image<P: AsRef<Path>>(path: P, blocks_count: u64) -> Result<ImageSummary> {
    let path = path.as_ref();
    let total_bytes = blocks_count
        .checked_mul(BLOCK_SIZE)
        .ok_or(Error::ImageTooLarge {
            blocks: blocks_count,
        })?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    file.set_len(total_bytes)?;

    let superblock = Superblock::new(blocks_count);
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&superblock.to_bytes())?;
    file.sync_all()?;

    info!(
        path = %path.display(),
        blocks_count,
        total_bytes,
        "formatted BaseFS image"
    );

    Ok(ImageSummary {
        path: path.to_path_buf(),
        blocks_count,
        total_bytes,
    })
}

/// Read and validate the superblock of an existing image.
///
/// # Errors
/// - `Error::Io` if the file cannot be opened or read
/// - `Error::TruncatedSuperblock` if the file is shorter than a superblock
/// - `Error::BadMagic` if it is not a BaseFS image
pub fn read_superblock<P: AsRef<Path>>(path: P) -> Result<Superblock> {
    let file = File::open(path)?;

    let mut data = Vec::with_capacity(Superblock::SIZE);
    file.take(Superblock::SIZE as u64).read_to_end(&mut data)?;

    let superblock = Superblock::from_bytes(&data)?;
    superblock.validate()?;
    Ok(superblock)
}
