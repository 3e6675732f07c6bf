//! Block emission engine.
//!
//! - [`BlockProcessor`] - Stateful re-chunker with `write()`/`end()` API and flow control
//! - [`BlockSink`] / [`StreamEvent`] - Downstream event contract
//! - [`BlockReader`] / [`BlockIter`] - Blocking adapter over [`std::io::Read`]

mod engine;
mod iter;
mod sink;

pub use engine::{BlockProcessor, Callback, Transform};
pub use iter::{BlockIter, BlockReader};
pub use sink::{BlockSink, StreamEvent};
