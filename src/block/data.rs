//! The Block type - one fixed-size (or final short) slice of the stream.

use bytes::Bytes;
use std::fmt;

use super::BlockHash;

/// A block emitted downstream.
///
/// `data` is exactly the configured block size, except for the final block of
/// a stream with partial emission enabled. When a transform is installed,
/// `data` holds the transformed bytes while `offset` still refers to the
/// input stream.
///
/// # Example
///
/// ```
/// use blockrs::Block;
/// use bytes::Bytes;
///
/// let block = Block {
///     data: Bytes::from_static(b"0123"),
///     offset: Some(4),
///     hash: None,
/// };
///
/// assert_eq!(block.range(), 4..8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The block bytes (shared with the written segment when no copy was needed).
    pub data: Bytes,

    /// Offset of the block's first byte in the input stream.
    pub offset: Option<u64>,

    /// The content hash of this block (if computed).
    pub hash: Option<BlockHash>,
}

impl Block {
    /// Creates a new block with the given data.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            offset: None,
            hash: None,
        }
    }

    /// Creates a new block with an offset.
    pub fn with_offset(data: impl Into<Bytes>, offset: u64) -> Self {
        Self {
            data: data.into(),
            offset: Some(offset),
            hash: None,
        }
    }

    /// Sets the hash.
    pub fn set_hash(mut self, hash: BlockHash) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Returns the length of the block data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the block has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a reference to the block data.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the start offset (0 if not set).
    pub fn start(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.start() + self.data.len() as u64
    }

    /// Returns the block as a range.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.start()..self.end()
    }

    /// Consumes the block and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl From<Bytes> for Block {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for Block {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({} bytes", self.len())?;
        if let Some(offset) = self.offset {
            write!(f, " @ {}", offset)?;
        }
        if let Some(hash) = self.hash {
            write!(f, ", hash={}", hash)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let block = Block::new(&b"0123"[..]);
        assert_eq!(block.len(), 4);
        assert!(!block.is_empty());
        assert_eq!(block.offset, None);
    }

    #[test]
    fn test_with_offset_and_range() {
        let block = Block::with_offset(&b"4567"[..], 4);
        assert_eq!(block.start(), 4);
        assert_eq!(block.end(), 8);
        assert_eq!(block.range(), 4..8);
    }

    #[test]
    fn test_range_without_offset() {
        let block = Block::new(&b"89"[..]);
        assert_eq!(block.range(), 0..2);
    }

    #[test]
    fn test_set_hash() {
        let hash = BlockHash::new([7u8; 32]);
        let block = Block::new(&b"abcd"[..]).set_hash(hash);
        assert_eq!(block.hash, Some(hash));
    }

    #[test]
    fn test_display() {
        let block = Block::with_offset(&b"hello"[..], 10);
        let s = block.to_string();
        assert!(s.contains("5 bytes"));
        assert!(s.contains("@ 10"));
    }

    #[test]
    fn test_into_data_keeps_allocation() {
        let bytes = Bytes::from_static(b"same");
        let block: Block = bytes.clone().into();
        assert_eq!(block.into_data().as_ptr(), bytes.as_ptr());
    }
}
