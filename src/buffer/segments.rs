//! Segment-list buffer: written `Bytes` are retained as-is and sliced lazily.

use std::collections::VecDeque;

use bytes::Bytes;

use super::BlockBuffer;
use crate::error::BufferError;
use crate::util::alloc_block;

/// The default [`BlockBuffer`].
///
/// Holds an ordered list of caller segments plus a read offset into the head
/// segment. A block that lies inside a single segment is returned as a
/// zero-copy slice of it; when the head segment is exactly one block long and
/// untouched, the segment itself is returned. Only blocks spanning segment
/// boundaries are copied.
///
/// # Invariants
///
/// - `total_len` equals the unconsumed bytes across all retained segments
/// - `consumed < head.len()`; a fully consumed head is evicted immediately
/// - no retained segment is empty
#[derive(Debug, Default, Clone)]
pub struct SegmentBuffer {
    segments: VecDeque<Bytes>,
    total_len: usize,
    consumed: usize,
    zero_fill: bool,
}

impl SegmentBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer that zero-initialises blocks it has to copy.
    pub fn with_zero_fill(zero_fill: bool) -> Self {
        Self {
            zero_fill,
            ..Self::default()
        }
    }

    /// Returns the number of retained segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the read offset into the head segment.
    pub fn consumed_offset(&self) -> usize {
        self.consumed
    }

    /// Moves the read position forward by `n` bytes within the head segment.
    fn advance(&mut self, n: usize) {
        self.consumed += n;
        if let Some(head) = self.segments.front() {
            if self.consumed >= head.len() {
                self.segments.pop_front();
                self.consumed = 0;
            }
        }
    }

    /// Carves one block of `size` bytes from the head of the list.
    fn carve(&mut self, size: usize) -> Result<Bytes, BufferError> {
        let head = self.segments.front().ok_or(BufferError::Underrun {
            needed: size,
            available: 0,
        })?;

        // Fits inside the head segment: no copy.
        if head.len() - self.consumed >= size {
            let block = if self.consumed == 0 && head.len() == size {
                head.clone()
            } else {
                head.slice(self.consumed..self.consumed + size)
            };
            self.advance(size);
            self.total_len -= size;
            return Ok(block);
        }

        let mut block = alloc_block(size, self.zero_fill);
        while block.len() < size {
            let needed = size - block.len();
            let Some(head) = self.segments.front() else {
                let available = block.len();
                self.consumed = 0;
                self.total_len = 0;
                return Err(BufferError::Underrun { needed, available });
            };
            let take = needed.min(head.len() - self.consumed);
            block.extend_from_slice(&head[self.consumed..self.consumed + take]);
            self.advance(take);
        }

        self.total_len -= size;
        Ok(block.freeze())
    }
}

impl BlockBuffer for SegmentBuffer {
    fn add_buffer(&mut self, segment: Bytes) -> Result<(), BufferError> {
        if segment.is_empty() {
            return Ok(());
        }
        self.total_len += segment.len();
        self.segments.push_back(segment);
        Ok(())
    }

    fn total_len(&self) -> usize {
        self.total_len
    }

    fn chunks(&mut self, size: usize) -> Result<Vec<Bytes>, BufferError> {
        if size == 0 || self.total_len < size {
            return Ok(Vec::new());
        }

        let mut blocks = Vec::with_capacity(self.total_len / size);
        while self.total_len >= size {
            blocks.push(self.carve(size)?);
        }
        Ok(blocks)
    }

    fn remaining(&self) -> Result<Option<Bytes>, BufferError> {
        if self.total_len == 0 {
            return Ok(None);
        }

        if self.segments.len() == 1 {
            let head = &self.segments[0];
            return Ok(Some(head.slice(self.consumed..)));
        }

        let mut out = alloc_block(self.total_len, self.zero_fill);
        for (i, segment) in self.segments.iter().enumerate() {
            let start = if i == 0 { self.consumed } else { 0 };
            out.extend_from_slice(&segment[start..]);
        }

        if out.len() != self.total_len {
            return Err(BufferError::Other(format!(
                "segment list holds {} bytes but total_len is {}",
                out.len(),
                self.total_len
            )));
        }
        Ok(Some(out.freeze()))
    }

    fn clear(&mut self) {
        self.segments.clear();
        self.total_len = 0;
        self.consumed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(parts: &[&'static [u8]]) -> SegmentBuffer {
        let mut buf = SegmentBuffer::new();
        for part in parts {
            buf.add_buffer(Bytes::from_static(part)).unwrap();
        }
        buf
    }

    #[test]
    fn test_add_tracks_total_len() {
        let mut buf = SegmentBuffer::new();
        buf.add_buffer(Bytes::from_static(b"abc")).unwrap();
        buf.add_buffer(Bytes::new()).unwrap();
        buf.add_buffer(Bytes::from_static(b"de")).unwrap();
        assert_eq!(buf.total_len(), 5);
        assert_eq!(buf.segment_count(), 2, "empty segment must not be retained");
    }

    #[test]
    fn test_chunks_single_segment() {
        let mut buf = buffer_with(&[b"0123456789ABCDEF"]);
        let blocks = buf.chunks(4).unwrap();
        let blocks: Vec<&[u8]> = blocks.iter().map(|b| b.as_ref()).collect();
        assert_eq!(blocks, vec![&b"0123"[..], b"4567", b"89AB", b"CDEF"]);
        assert_eq!(buf.total_len(), 0);
        assert_eq!(buf.segment_count(), 0);
    }

    #[test]
    fn test_chunks_leave_remainder() {
        let mut buf = buffer_with(&[b"0123456789"]);
        let blocks = buf.chunks(4).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(buf.total_len(), 2);
        assert_eq!(buf.consumed_offset(), 8);
        assert_eq!(buf.remaining().unwrap().as_deref(), Some(&b"89"[..]));
    }

    #[test]
    fn test_chunks_span_segments() {
        let mut buf = buffer_with(&[b"01", b"2", b"345", b"67"]);
        let blocks = buf.chunks(3).unwrap();
        let blocks: Vec<&[u8]> = blocks.iter().map(|b| b.as_ref()).collect();
        assert_eq!(blocks, vec![&b"012"[..], b"345"]);
        assert_eq!(buf.total_len(), 2);
        assert_eq!(buf.segment_count(), 1);
    }

    #[test]
    fn test_chunks_too_little_data() {
        let mut buf = buffer_with(&[b"abc"]);
        assert!(buf.chunks(4).unwrap().is_empty());
        assert_eq!(buf.total_len(), 3, "failed carve must not consume");
    }

    #[test]
    fn test_chunks_zero_size() {
        let mut buf = buffer_with(&[b"abc"]);
        assert!(buf.chunks(0).unwrap().is_empty());
        assert_eq!(buf.total_len(), 3);
    }

    #[test]
    fn test_chunks_empty_buffer() {
        let mut buf = SegmentBuffer::new();
        assert!(buf.chunks(4).unwrap().is_empty());
    }

    #[test]
    fn test_exact_segment_is_returned_without_copy() {
        let segment = Bytes::from(vec![7u8; 8]);
        let mut buf = SegmentBuffer::new();
        buf.add_buffer(segment.clone()).unwrap();

        let blocks = buf.chunks(8).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_ptr(), segment.as_ptr());
        assert_eq!(blocks[0].len(), segment.len());
    }

    #[test]
    fn test_in_segment_block_is_a_slice() {
        let segment = Bytes::from(b"abcdefgh".to_vec());
        let mut buf = SegmentBuffer::new();
        buf.add_buffer(segment.clone()).unwrap();

        let blocks = buf.chunks(4).unwrap();
        assert_eq!(blocks[1].as_ptr() as usize, segment.as_ptr() as usize + 4);
    }

    #[test]
    fn test_spanning_block_is_copied() {
        let first = Bytes::from(b"ab".to_vec());
        let mut buf = SegmentBuffer::with_zero_fill(true);
        buf.add_buffer(first.clone()).unwrap();
        buf.add_buffer(Bytes::from(b"cd".to_vec())).unwrap();

        let blocks = buf.chunks(4).unwrap();
        assert_eq!(&blocks[0][..], b"abcd");
        assert_ne!(blocks[0].as_ptr(), first.as_ptr());
    }

    #[test]
    fn test_remaining_does_not_consume() {
        let mut buf = buffer_with(&[b"abc", b"de"]);
        assert_eq!(buf.remaining().unwrap().as_deref(), Some(&b"abcde"[..]));
        assert_eq!(buf.total_len(), 5);

        let _ = buf.chunks(4).unwrap();
        assert_eq!(buf.remaining().unwrap().as_deref(), Some(&b"e"[..]));
    }

    #[test]
    fn test_remaining_single_segment_is_a_slice() {
        let segment = Bytes::from(b"abcdef".to_vec());
        let mut buf = SegmentBuffer::new();
        buf.add_buffer(segment.clone()).unwrap();
        let _ = buf.chunks(4).unwrap();

        let rest = buf.remaining().unwrap().unwrap();
        assert_eq!(rest.as_ptr() as usize, segment.as_ptr() as usize + 4);
    }

    #[test]
    fn test_remaining_empty() {
        let buf = SegmentBuffer::new();
        assert!(buf.remaining().unwrap().is_none());
    }

    #[test]
    fn test_clear() {
        let mut buf = buffer_with(&[b"abc", b"def"]);
        let _ = buf.chunks(2).unwrap();
        buf.clear();
        assert_eq!(buf.total_len(), 0);
        assert_eq!(buf.segment_count(), 0);
        assert_eq!(buf.consumed_offset(), 0);
        assert!(buf.remaining().unwrap().is_none());
    }

    #[test]
    fn test_byte_order_across_many_segments() {
        let data: Vec<u8> = (0..=255).collect();
        let mut buf = SegmentBuffer::new();
        for part in data.chunks(7) {
            buf.add_buffer(Bytes::copy_from_slice(part)).unwrap();
        }

        let mut out = Vec::new();
        for block in buf.chunks(10).unwrap() {
            assert_eq!(block.len(), 10);
            out.extend_from_slice(&block);
        }
        out.extend_from_slice(&buf.remaining().unwrap().unwrap());
        assert_eq!(out, data);
    }
}
