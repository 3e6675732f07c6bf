//! Async stream adapter for block reading.
//!
//! # Example
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
//!         println!("Block: {} bytes", block.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::block::Block;
use crate::config::BlockConfig;
use crate::error::BlockError;
use crate::processor::{BlockProcessor, StreamEvent};
use crate::util::READ_BUF_SIZE;

pin_project! {
    /// A stream that yields blocks from an async reader.
    ///
    /// This uses `futures_io::AsyncRead` which is runtime-agnostic.
    /// Works with tokio, async-std, smol, or any futures-compatible runtime.
    pub struct BlockStream<R> {
        #[pin]
        reader: R,
        processor: BlockProcessor<VecDeque<StreamEvent>>,
        buffer: Vec<u8>,
        finished: bool,
    }
}

impl<R> BlockStream<R> {
    /// Creates a new block stream from an async reader.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::InvalidConfig`] if the configuration is invalid.
    pub fn new(reader: R, config: BlockConfig) -> Result<Self, BlockError> {
        Ok(Self {
            reader,
            processor: BlockProcessor::new(config, VecDeque::new())?,
            buffer: vec![0u8; READ_BUF_SIZE],
            finished: false,
        })
    }
}

impl<R: AsyncRead> Stream for BlockStream<R> {
    type Item = Result<Block, BlockError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            while let Some(event) = this.processor.sink_mut().pop_front() {
                match event {
                    StreamEvent::Data(block) => {
                        if this.processor.config().max_buffered_blocks().is_some() {
                            this.processor.acknowledge(1);
                        }
                        return Poll::Ready(Some(Ok(block)));
                    }
                    StreamEvent::Error(err) => return Poll::Ready(Some(Err(err))),
                    StreamEvent::End => *this.finished = true,
                    StreamEvent::Drain => {}
                }
            }

            if *this.finished || this.processor.is_ended() {
                *this.finished = true;
                return Poll::Ready(None);
            }

            match this.reader.as_mut().poll_read(cx, &mut this.buffer[..]) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Poll::Ready(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(BlockError::Io(e))));
                }
                Poll::Ready(Ok(0)) => this.processor.end(),
                Poll::Ready(Ok(n)) => {
                    if let Err(err) = this.processor.write_slice(&this.buffer[..n]) {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(err)));
                    }
                }
            }
        }
    }
}

/// Creates a block stream from an async reader.
///
/// Uses `futures_io::AsyncRead` for runtime-agnostic async I/O.
///
/// # Runtime Compatibility
///
/// For tokio users, you can use `tokio_util::compat` to convert
/// `tokio::io::AsyncRead` to `futures_io::AsyncRead`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use blockrs::{block_async, BlockConfig};
///
/// let tokio_reader = tokio::fs::File::open("file").await?;
/// let stream = block_async(tokio_reader.compat(), BlockConfig::new(4096)?)?;
/// ```
pub fn block_async<R: AsyncRead>(
    reader: R,
    config: BlockConfig,
) -> Result<BlockStream<R>, BlockError> {
    BlockStream::new(reader, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_block_stream_empty() {
        let reader: &[u8] = &[];
        let stream = block_async(reader, BlockConfig::new(4).unwrap()).unwrap();
        let blocks: Vec<_> = stream.collect().await;
        assert!(blocks.is_empty());
    }

    #[tokio::test]
    async fn test_block_stream_sizes() {
        let data: Vec<u8> = (0..10_000).map(|i| (i % 256) as u8).collect();
        let reader: &[u8] = &data;
        let stream = block_async(reader, BlockConfig::new(4096).unwrap()).unwrap();

        let blocks: Vec<_> = stream.collect().await;
        let blocks: Vec<Block> = blocks.into_iter().collect::<Result<_, _>>().unwrap();

        let sizes: Vec<usize> = blocks.iter().map(Block::len).collect();
        assert_eq!(sizes, vec![4096, 4096, 1808]);

        let joined: Vec<u8> = blocks.iter().flat_map(|b| b.data.iter().copied()).collect();
        assert_eq!(joined, data);
    }

    #[tokio::test]
    async fn test_block_stream_short_reads() {
        use tokio_util::compat::TokioAsyncReadCompatExt;

        let reader = tokio_test::io::Builder::new()
            .read(b"abc")
            .read(b"defgh")
            .read(b"i")
            .build();
        let config = BlockConfig::new(4).unwrap().with_emit_partial(false);
        let stream = block_async(reader.compat(), config).unwrap();

        let blocks: Vec<Block> = stream
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        let data: Vec<&[u8]> = blocks.iter().map(|b| b.data.as_ref()).collect();
        assert_eq!(data, vec![&b"abcd"[..], b"efgh", b"i\0\0\0"]);
    }

    #[tokio::test]
    async fn test_block_stream_block_cap() {
        let reader: &[u8] = b"abcdefg";
        let config = BlockConfig::new(2)
            .unwrap()
            .with_max_buffered_blocks(Some(1));
        let blocks: Vec<Block> = block_async(reader, config)
            .unwrap()
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        let data: Vec<&[u8]> = blocks.iter().map(|b| b.data.as_ref()).collect();
        assert_eq!(data, vec![&b"ab"[..], b"cd", b"ef", b"g"]);
    }

    #[tokio::test]
    async fn test_block_stream_invalid_config() {
        let reader: &[u8] = b"abc";
        assert!(block_async(reader, BlockConfig::default().with_block_size(0)).is_err());
    }
}
