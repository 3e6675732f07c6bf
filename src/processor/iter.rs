//! Blocking reader adapter - BlockReader and BlockIter.
//!
//! - [`BlockReader`] - Configures and starts block reading
//! - [`BlockIter`] - Iterator that yields blocks from a [`std::io::Read`] source
//!
//! # Example
//!
//! ```
//! use blockrs::{BlockConfig, BlockReader};
//! use std::io::Cursor;
//!
//! let reader = BlockReader::new(BlockConfig::new(4)?);
//! let blocks = reader
//!     .blocks(Cursor::new(&b"0123456789"[..]))?
//!     .collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(blocks.len(), 3);
//! # Ok::<(), blockrs::BlockError>(())
//! ```

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;

use super::{BlockProcessor, StreamEvent};
use crate::block::Block;
use crate::config::BlockConfig;
use crate::error::BlockError;
use crate::util::READ_BUF_SIZE;

/// Reads byte sources into fixed-size blocks.
///
/// `BlockReader` holds a configuration and builds a [`BlockProcessor`] per
/// source. Use [`BlockProcessor`] directly for push-style input or for
/// transforms, callbacks and flow control.
#[derive(Debug, Clone, Default)]
pub struct BlockReader {
    config: BlockConfig,
}

impl BlockReader {
    /// Creates a new reader with the given configuration.
    pub fn new(config: BlockConfig) -> Self {
        Self { config }
    }

    /// Creates a block iterator over `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::InvalidConfig`] if the configuration is invalid.
    pub fn blocks<R: Read>(self, reader: R) -> Result<BlockIter<R>, BlockError> {
        BlockIter::new(reader, self.config)
    }

    /// Splits an in-memory buffer into blocks.
    ///
    /// Blocks that fall inside `data` are zero-copy slices of it.
    ///
    /// # Example
    ///
    /// ```
    /// use blockrs::{BlockConfig, BlockReader};
    ///
    /// let reader = BlockReader::new(BlockConfig::new(4)?);
    /// let blocks = reader.block_bytes("0123456789ABCDEF")?;
    /// assert_eq!(blocks.len(), 4);
    /// # Ok::<(), blockrs::BlockError>(())
    /// ```
    pub fn block_bytes(&self, data: impl Into<Bytes>) -> Result<Vec<Block>, BlockError> {
        // Every block is collected before returning; a block cap would only stall.
        let config = self.config.clone().with_max_buffered_blocks(None);
        let mut processor = BlockProcessor::new(config, Vec::new())?;
        processor.end_with(data);

        let mut blocks = Vec::new();
        for event in processor.into_sink() {
            match event {
                StreamEvent::Data(block) => blocks.push(block),
                StreamEvent::Error(err) => return Err(err),
                StreamEvent::Drain | StreamEvent::End => {}
            }
        }
        Ok(blocks)
    }
}

/// An iterator that yields blocks from a reader.
///
/// Reads up to 8 KiB at a time, feeds it to a [`BlockProcessor`] and
/// yields its data events; errors are yielded in place. The final short (or
/// padded) block is yielded once the reader reports EOF.
///
/// With `max_buffered_blocks` set, each yielded block is acknowledged as it
/// leaves the iterator.
#[derive(Debug)]
pub struct BlockIter<R> {
    reader: R,
    processor: BlockProcessor<VecDeque<StreamEvent>>,
    read_buf: Vec<u8>,
    finished: bool,
}

impl<R: Read> BlockIter<R> {
    fn new(reader: R, config: BlockConfig) -> Result<Self, BlockError> {
        Ok(Self {
            reader,
            processor: BlockProcessor::new(config, VecDeque::new())?,
            read_buf: vec![0u8; READ_BUF_SIZE],
            finished: false,
        })
    }

    /// Returns the input offset of the next block to be yielded by the processor.
    pub fn offset(&self) -> u64 {
        self.processor.offset()
    }
}

impl<R: Read> Iterator for BlockIter<R> {
    type Item = Result<Block, BlockError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(event) = self.processor.sink_mut().pop_front() {
                match event {
                    StreamEvent::Data(block) => {
                        if self.processor.config().max_buffered_blocks().is_some() {
                            self.processor.acknowledge(1);
                        }
                        return Some(Ok(block));
                    }
                    StreamEvent::Error(err) => return Some(Err(err)),
                    StreamEvent::End => self.finished = true,
                    StreamEvent::Drain => {}
                }
            }

            if self.finished || self.processor.is_ended() {
                self.finished = true;
                return None;
            }

            match self.reader.read(&mut self.read_buf) {
                Ok(0) => self.processor.end(),
                Ok(n) => {
                    if let Err(err) = self.processor.write_slice(&self.read_buf[..n]) {
                        self.finished = true;
                        return Some(Err(err));
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_block_bytes_empty() {
        let reader = BlockReader::new(BlockConfig::new(4).unwrap());
        assert!(reader.block_bytes(Bytes::new()).unwrap().is_empty());
    }

    #[test]
    fn test_block_bytes_zero_copy() {
        let data = Bytes::from(b"0123456789".to_vec());
        let reader = BlockReader::new(BlockConfig::new(4).unwrap());
        let blocks = reader.block_bytes(data.clone()).unwrap();

        for block in &blocks {
            let start = block.data.as_ptr() as usize;
            assert!(start >= data.as_ptr() as usize);
            assert!(start + block.len() <= data.as_ptr() as usize + data.len());
        }
    }

    #[test]
    fn test_iterator_reassembles_input() {
        let data: Vec<u8> = (0..20_000).map(|i| (i % 251) as u8).collect();
        let reader = BlockReader::new(BlockConfig::new(1000).unwrap());

        let blocks: Vec<_> = reader
            .blocks(Cursor::new(&data))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(blocks.len(), 20);
        let joined: Vec<u8> = blocks.iter().flat_map(|b| b.data.iter().copied()).collect();
        assert_eq!(joined, data);
    }

    #[test]
    fn test_iterator_offsets() {
        let data = vec![1u8; 10_000];
        let reader = BlockReader::new(BlockConfig::new(3000).unwrap());

        let mut expected_offset = 0u64;
        for block in reader.blocks(Cursor::new(&data)).unwrap() {
            let block = block.unwrap();
            assert_eq!(block.offset, Some(expected_offset));
            expected_offset += block.len() as u64;
        }
        assert_eq!(expected_offset, 10_000);
    }

    #[test]
    fn test_iterator_padding() {
        let config = BlockConfig::new(4)
            .unwrap()
            .with_emit_partial(false)
            .with_padding(b'P');
        let blocks: Vec<_> = BlockReader::new(config)
            .blocks(Cursor::new(&b"0123456789"[..]))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(&blocks[2].data[..], b"89PP");
    }

    #[test]
    fn test_block_cap_yields_every_block() {
        let config = BlockConfig::new(2)
            .unwrap()
            .with_max_buffered_blocks(Some(1));
        let reader = BlockReader::new(config);

        let blocks: Vec<_> = reader
            .clone()
            .blocks(Cursor::new(&b"abcdefg"[..]))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let joined: Vec<u8> = blocks.iter().flat_map(|b| b.data.iter().copied()).collect();
        assert_eq!(joined, b"abcdefg");
        assert_eq!(blocks.len(), 4);

        let blocks = reader.block_bytes("abcdefg").unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(&blocks[3].data[..], b"g");
    }

    #[test]
    fn test_invalid_config() {
        let reader = BlockReader::new(BlockConfig::default().with_block_size(0));
        assert!(reader.blocks(Cursor::new(&b"abc"[..])).is_err());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_io_error_is_yielded_once() {
        let mut iter = BlockReader::new(BlockConfig::new(4).unwrap())
            .blocks(FailingReader)
            .unwrap();
        assert!(matches!(iter.next(), Some(Err(BlockError::Io(_)))));
        assert!(iter.next().is_none());
    }
}
