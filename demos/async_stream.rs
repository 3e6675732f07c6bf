//! Async block streaming example.
//!
//! Reads a file through tokio and yields blocks from a `BlockStream`.
//!
//! Run with:
//!     cargo run --example async_stream --features async-io -- /path/to/file

use std::env;

use blockrs::{BlockConfig, block_async};
use futures_util::StreamExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());

    println!("Async blocking file: {}\n", path);

    let file = tokio::fs::File::open(&path).await?;
    let mut stream = block_async(file.compat(), BlockConfig::new(1024)?)?;

    let mut total_blocks = 0;
    let mut total_bytes = 0;

    while let Some(block) = stream.next().await {
        let block = block?;
        total_blocks += 1;
        total_bytes += block.len();

        println!(
            "  Block {}: offset={:>8}, len={:>6}",
            total_blocks,
            block.offset.unwrap_or(0),
            block.len()
        );
    }

    println!("\nTotal: {} blocks, {} bytes", total_blocks, total_bytes);
    Ok(())
}
