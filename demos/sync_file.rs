//! File blocking example.
//!
//! Run with:
//!     cargo run --example sync_file -- /path/to/file

use std::env;
use std::fs::File;

use blockrs::{BlockConfig, BlockReader, HashConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());

    println!("Blocking file: {}\n", path);

    let file = File::open(&path)?;
    let metadata = file.metadata()?;
    println!("File size: {} bytes\n", metadata.len());

    // 4 KiB blocks, zero-padded to full size, hashed
    let config = BlockConfig::new(4 * 1024)?
        .with_emit_partial(false)
        .with_hash_config(HashConfig::enabled());

    let mut total_blocks = 0;

    for block in BlockReader::new(config).blocks(file)? {
        let block = block?;
        total_blocks += 1;

        match block.hash {
            Some(hash) => println!(
                "Block {}: offset={:>10}, len={:>6}, hash={}",
                total_blocks,
                block.offset.unwrap_or(0),
                block.len(),
                hash.to_hex()
            ),
            None => println!(
                "Block {}: offset={:>10}, len={:>6}",
                total_blocks,
                block.offset.unwrap_or(0),
                block.len()
            ),
        }
    }

    println!(
        "\nTotal: {} blocks, {} bytes on disk",
        total_blocks,
        total_blocks * 4 * 1024
    );

    Ok(())
}
