//! Block types.
//!
//! - [`Block`] - Emitted block with data, input offset, optional hash
//! - [`BlockHash`] - 32-byte BLAKE3 digest

mod data;
mod hash;

pub use data::Block;
pub use hash::BlockHash;
