//! Byte accumulation and block carving.
//!
//! - [`BlockBuffer`] - The buffer-manager seam used by the processor
//! - [`SegmentBuffer`] - Default segment-list implementation with zero-copy slicing

mod segments;

pub use segments::SegmentBuffer;

use bytes::Bytes;

use crate::error::BufferError;

/// Accumulates written segments and carves them into fixed-size blocks.
///
/// The processor owns one of these and is the only caller. Implementations
/// must keep byte order exactly and report `total_len` in O(1).
///
/// A test double can wrap [`SegmentBuffer`] to record or fail calls without
/// re-implementing the carving logic.
pub trait BlockBuffer {
    /// Appends a segment. Empty segments are ignored.
    fn add_buffer(&mut self, segment: Bytes) -> Result<(), BufferError>;

    /// Number of unconsumed bytes held.
    fn total_len(&self) -> usize;

    /// Carves as many complete `size`-byte blocks as are available, in order.
    ///
    /// Returns an empty vector when `size == 0` or fewer than `size` bytes
    /// are held.
    fn chunks(&mut self, size: usize) -> Result<Vec<Bytes>, BufferError>;

    /// Returns every unconsumed byte as one contiguous block without
    /// consuming it, or `None` when empty.
    fn remaining(&self) -> Result<Option<Bytes>, BufferError>;

    /// Discards everything held.
    fn clear(&mut self);
}

impl<T: BlockBuffer + ?Sized> BlockBuffer for &mut T {
    fn add_buffer(&mut self, segment: Bytes) -> Result<(), BufferError> {
        (**self).add_buffer(segment)
    }

    fn total_len(&self) -> usize {
        (**self).total_len()
    }

    fn chunks(&mut self, size: usize) -> Result<Vec<Bytes>, BufferError> {
        (**self).chunks(size)
    }

    fn remaining(&self) -> Result<Option<Bytes>, BufferError> {
        (**self).remaining()
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

impl<T: BlockBuffer + ?Sized> BlockBuffer for Box<T> {
    fn add_buffer(&mut self, segment: Bytes) -> Result<(), BufferError> {
        (**self).add_buffer(segment)
    }

    fn total_len(&self) -> usize {
        (**self).total_len()
    }

    fn chunks(&mut self, size: usize) -> Result<Vec<Bytes>, BufferError> {
        (**self).chunks(size)
    }

    fn remaining(&self) -> Result<Option<Bytes>, BufferError> {
        (**self).remaining()
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}
