//! Push-style block processing example.
//!
//! Writes a handful of odd-sized pieces, pauses mid-stream, and prints the
//! events the processor delivers to its sink.
//!
//! Run with:
//!     RUST_LOG=blockrs=trace cargo run --example sync_basic

use blockrs::{Block, BlockConfig, BlockError, BlockProcessor, BlockSink, Padding};
use tracing_subscriber::EnvFilter;

/// Prints every event as it arrives.
struct Printer {
    blocks: usize,
}

impl BlockSink for Printer {
    fn on_block(&mut self, block: Block) {
        self.blocks += 1;
        println!(
            "  Block {}: offset={:>4}, data={:?}",
            self.blocks,
            block.offset.unwrap_or(0),
            String::from_utf8_lossy(&block.data)
        );
    }

    fn on_drain(&mut self) {
        println!("  (drain)");
    }

    fn on_end(&mut self) {
        println!("  (end)");
    }

    fn on_error(&mut self, error: BlockError) {
        println!("  (error: {error})");
    }
}

fn main() -> Result<(), BlockError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = BlockConfig::new(8)?
        .with_emit_partial(false)
        .with_padding(Padding::pattern("."));

    let mut processor = BlockProcessor::new(config, Printer { blocks: 0 })?
        .with_transform(|data| Ok(data.to_ascii_uppercase().into()));

    println!("Writing...");
    for piece in ["the quick ", "brown", " fox ", "jumps"] {
        let more = processor.write(piece)?;
        println!("  wrote {:>2} bytes, keep writing: {more}", piece.len());
    }

    println!("Paused...");
    processor.pause();
    let more = processor.write(" over the lazy dog")?;
    println!("  buffered {} bytes, keep writing: {more}", processor.buffered_len());

    println!("Resumed...");
    processor.resume();

    println!("Ending...");
    processor.end();

    println!("\nTotal: {} blocks, {} input bytes", processor.sink().blocks, processor.offset());
    Ok(())
}
