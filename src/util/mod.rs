//! Internal utility functions and helpers.
//!
//! This module contains small allocation helpers shared by the buffer and the
//! processor. It is an implementation detail and not part of the public API.

use bytes::{BufMut, BytesMut};

/// Size of each read the reader adapters issue against their source.
pub(crate) const READ_BUF_SIZE: usize = 8 * 1024;

/// Allocates room for one block of `size` bytes.
///
/// With `zero_fill` the storage is zero-initialised and cleared before use;
/// otherwise capacity is only reserved. Callers then extend the returned
/// buffer, so the result is the same either way.
pub(crate) fn alloc_block(size: usize, zero_fill: bool) -> BytesMut {
    if zero_fill {
        let mut buf = BytesMut::zeroed(size);
        buf.clear();
        buf
    } else {
        BytesMut::with_capacity(size)
    }
}

/// Appends `count` bytes produced by `fill` (indexed from 0) to `dst`.
pub(crate) fn extend_with(dst: &mut BytesMut, count: usize, fill: impl Fn(usize) -> u8) {
    dst.reserve(count);
    for i in 0..count {
        dst.put_u8(fill(i));
    }
}
