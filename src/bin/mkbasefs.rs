//! mkbasefs - create a BaseFS image.
//!
//! ```text
//! mkbasefs <image-file> <number-of-blocks>
//! ```
//!
//! `mkbasefs basefs.img 1024` creates a 4 MB image (1024 × 4096 bytes) with
//! a fresh superblock in block 0.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use basefs::storage::format_image;

#[derive(Debug, Parser)]
#[command(name = "mkbasefs", version, about = "Create a BaseFS image")]
struct Args {
    /// Image file to create or overwrite
    image: PathBuf,

    /// Size of the image in 4096-byte blocks
    blocks: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let summary = format_image(&args.image, args.blocks)
        .with_context(|| format!("failed to format '{}'", args.image.display()))?;

    println!("{}", summary);
    Ok(())
}
