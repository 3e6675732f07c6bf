//! Error types for blockrs.

use std::fmt;

use thiserror::Error;

/// Boxed error returned by user-supplied block transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for blockrs operations.
pub type Result<T> = std::result::Result<T, BlockError>;

/// Errors that can occur while re-chunking a stream into blocks.
#[derive(Debug, Error)]
pub enum BlockError {
    /// An I/O error occurred while reading input data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A write was attempted after the stream was ended.
    #[error("write after end")]
    WriteAfterEnd,

    /// The buffer manager failed while performing `op`.
    #[error("buffer {op} failed")]
    Buffer {
        /// The buffer operation that failed.
        op: BufferOp,
        /// The underlying buffer failure.
        #[source]
        source: BufferError,
    },

    /// The user-supplied transform failed on a block.
    #[error("transform failed on block at offset {offset}")]
    Transform {
        /// Input-stream offset of the block that failed.
        offset: u64,
        /// The error raised by the transform.
        #[source]
        source: BoxError,
    },
}

impl BlockError {
    /// Wraps a buffer failure with the name of the operation that raised it.
    pub fn buffer(op: BufferOp, source: BufferError) -> Self {
        Self::Buffer { op, source }
    }

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

/// Buffer manager operations, used to label wrapped [`BufferError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferOp {
    /// Appending a segment.
    Add,
    /// Carving complete blocks.
    Chunks,
    /// Reading the sub-block remainder.
    Remaining,
}

impl fmt::Display for BufferOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BufferOp::Add => "add",
            BufferOp::Chunks => "chunks",
            BufferOp::Remaining => "remaining",
        };
        f.write_str(name)
    }
}

/// Failures raised by a [`BlockBuffer`](crate::BlockBuffer) implementation.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The segment list ran out before a block could be filled.
    #[error("buffer underrun: needed {needed} bytes, {available} available")]
    Underrun {
        /// Bytes still required for the block.
        needed: usize,
        /// Bytes actually left in the segment list.
        available: usize,
    },

    /// Implementation-specific failure.
    #[error("{0}")]
    Other(String),
}
