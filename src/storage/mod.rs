//! Storage layer - on-disk image format.
//!
//! This module handles the persistent side of BaseFS:
//! - [`Superblock`] - The header at the start of every image
//! - [`format_image`] / [`read_superblock`] - Image creation and inspection
//!
//! The B-tree index is memory-resident and does not use this layer.

mod image;
mod superblock;

pub use image::{format_image, read_superblock, ImageSummary};
pub use superblock::Superblock;
