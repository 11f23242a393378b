//! On-disk superblock.
//!
//! Every BaseFS image starts with a [`Superblock`] at byte 0 of block 0.

use crate::common::config::BASEFS_MAGIC;
use crate::common::{Error, Result};

/// Filesystem-wide metadata stored at the start of an image.
///
/// # Layout (24 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     magic (little-endian)
/// 4       4     padding (zero)
/// 8       8     blocks_count (little-endian)
/// 16      8     inodes_count (little-endian)
/// ```
///
/// The padding keeps the 64-bit counters naturally aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    pub magic: u32,
    /// Number of `BLOCK_SIZE` blocks in the image.
    pub blocks_count: u64,
    /// Number of inodes in use; a fresh image has none.
    pub inodes_count: u64,
}

impl Superblock {
    /// Size of the encoded superblock in bytes.
    pub const SIZE: usize = 24;

    pub const OFFSET_MAGIC: usize = 0;
    pub const OFFSET_BLOCKS_COUNT: usize = 8;
    pub const OFFSET_INODES_COUNT: usize = 16;

    /// Superblock for a fresh image of `blocks_count` blocks.
    pub fn new(blocks_count: u64) -> Self {
        Self {
            magic: BASEFS_MAGIC,
            blocks_count,
            inodes_count: 0,
        }
    }

    /// Encode to the on-disk layout.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut data = [0u8; Self::SIZE];
        data[Self::OFFSET_MAGIC..Self::OFFSET_MAGIC + 4].copy_from_slice(&self.magic.to_le_bytes());
        data[Self::OFFSET_BLOCKS_COUNT..Self::OFFSET_BLOCKS_COUNT + 8]
            .copy_from_slice(&self.blocks_count.to_le_bytes());
        data[Self::OFFSET_INODES_COUNT..Self::OFFSET_INODES_COUNT + 8]
            .copy_from_slice(&self.inodes_count.to_le_bytes());
        data
    }

    /// Decode from the beginning of a byte slice.
    ///
    /// The magic number is not checked; see [`Superblock::validate`].
    ///
    /// # Errors
    /// `Error::TruncatedSuperblock` if `data` is shorter than [`Superblock::SIZE`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::TruncatedSuperblock(data.len()));
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[Self::OFFSET_MAGIC..Self::OFFSET_MAGIC + 4]);

        let mut blocks_count = [0u8; 8];
        blocks_count.copy_from_slice(&data[Self::OFFSET_BLOCKS_COUNT..Self::OFFSET_BLOCKS_COUNT + 8]);

        let mut inodes_count = [0u8; 8];
        inodes_count.copy_from_slice(&data[Self::OFFSET_INODES_COUNT..Self::OFFSET_INODES_COUNT + 8]);

        Ok(Self {
            magic: u32::from_le_bytes(magic),
            blocks_count: u64::from_le_bytes(blocks_count),
            inodes_count: u64::from_le_bytes(inodes_count),
        })
    }

    /// Check that this superblock belongs to a BaseFS image.
    ///
    /// # Errors
    /// `Error::BadMagic` with the magic that was found.
    pub fn validate(&self) -> Result<()> {
        if self.magic != BASEFS_MAGIC {
            return Err(Error::BadMagic(self.magic));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_superblock() {
        let sb = Superblock::new(1024);
        assert_eq!(sb.magic, BASEFS_MAGIC);
        assert_eq!(sb.blocks_count, 1024);
        assert_eq!(sb.inodes_count, 0);
        assert!(sb.validate().is_ok());
    }

    #[test]
    fn test_superblock_byte_layout() {
        let sb = Superblock {
            magic: BASEFS_MAGIC,
            blocks_count: 0x0807060504030201,
            inodes_count: 0x11,
        };

        let bytes = sb.to_bytes();

        assert_eq!(&bytes[0..4], &[0x65, 0x73, 0x61, 0x62]); // "esab" little-endian
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]); // padding
        assert_eq!(bytes[8], 0x01); // blocks_count LSB
        assert_eq!(bytes[15], 0x08); // blocks_count MSB
        assert_eq!(bytes[16], 0x11);
        assert_eq!(&bytes[17..24], &[0; 7]);
    }

    #[test]
    fn test_superblock_decode() {
        let original = Superblock {
            magic: BASEFS_MAGIC,
            blocks_count: 77,
            inodes_count: 5,
        };

        let mut block = vec![0xFFu8; 4096];
        block[..Superblock::SIZE].copy_from_slice(&original.to_bytes());

        assert_eq!(Superblock::from_bytes(&block).unwrap(), original);
    }

    #[test]
    fn test_truncated_superblock() {
        let err = Superblock::from_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, Error::TruncatedSuperblock(10)));
    }

    #[test]
    fn test_bad_magic() {
        let sb = Superblock::from_bytes(&[0u8; Superblock::SIZE]).unwrap();
        assert!(matches!(sb.validate(), Err(Error::BadMagic(0))));
    }
}
