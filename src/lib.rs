//! blockrs
//!
//! Streaming fixed-size block re-chunking for Rust.
//!
//! `blockrs` turns writes of arbitrary size into a sequence of fixed-size
//! blocks. It is designed as a small, composable primitive for:
//!
//! - block-oriented storage and encryption
//! - framing byte streams for fixed-size transports
//! - padding streams to a block boundary
//!
//! The crate intentionally:
//! - does NOT manage files, sockets or paths
//! - does NOT spawn threads or tasks
//! - does NOT interpret block contents (transforms are caller-supplied)
//!
//! It only does one thing: **Write bytes → emit blocks**
//!
//! # Push
//!
//! ```
//! use blockrs::{BlockConfig, BlockProcessor, StreamEvent};
//!
//! let mut processor = BlockProcessor::new(BlockConfig::new(4)?, Vec::new())?;
//! processor.write("0123")?;
//! processor.write("4567")?;
//! processor.end_with("89");
//!
//! for event in processor.into_sink() {
//!     if let StreamEvent::Data(block) = event {
//!         println!("block {} bytes @ {:?}", block.len(), block.offset);
//!     }
//! }
//! # Ok::<(), blockrs::BlockError>(())
//! ```
//!
//! # Sync
//!
//! ```no_run
//! use std::fs::File;
//! use blockrs::{BlockConfig, BlockError, BlockReader};
//!
//! fn main() -> Result<(), BlockError> {
//!     let file = File::open("data.bin")?;
//!     let reader = BlockReader::new(BlockConfig::new(4096)?);
//!
//!     for block in reader.blocks(file)? {
//!         let block = block?;
//!         println!("block {} bytes", block.data.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use blockrs::{block_async, BlockConfig};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), blockrs::BlockError> {
//!     let mut stream = block_async(reader, BlockConfig::new(4096)?)?;
//!
//!     while let Some(block) = stream.next().await {
//!         let block = block?;
//!         println!("block {}", block.data.len());
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod block;
mod buffer;
mod config;
mod error;
mod processor;
mod state;

mod hash; // internal blake3 impl
mod util;

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use block::{Block, BlockHash};
pub use buffer::{BlockBuffer, SegmentBuffer};
pub use config::{BlockConfig, HashConfig, Padding};
pub use error::{BlockError, BoxError, BufferError, BufferOp, Result};
pub use processor::{
    BlockIter, BlockProcessor, BlockReader, BlockSink, Callback, StreamEvent, Transform,
};
pub use state::{FlowFlags, FlowState};

#[cfg(feature = "async-io")]
pub use async_stream::{BlockStream, block_async};
