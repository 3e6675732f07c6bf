//! Core block engine - BlockProcessor with a write/end streaming API.
//!
//! The processor sits between a producer calling `write()` and a downstream
//! [`BlockSink`]. It buffers writes of any size, carves fixed-size blocks,
//! runs the optional transform and callback on each one, and drives the
//! sink's data/drain/end/error events.
//!
//! - `write()` - Buffer data; emit once a full block is available
//! - `pause()` / `resume()` - Suspend and restart emission (writes keep buffering)
//! - `flush()` - Emit everything, including a short final block
//! - `end()` - Refuse further writes, flush, then signal end
//!
//! # Example
//!
//! ```
//! use blockrs::{BlockConfig, BlockProcessor, StreamEvent};
//!
//! let mut processor = BlockProcessor::new(BlockConfig::new(4)?, Vec::new())?;
//!
//! processor.write("0123456789")?;
//! processor.end();
//!
//! let blocks: Vec<_> = processor
//!     .into_sink()
//!     .into_iter()
//!     .filter_map(StreamEvent::into_block)
//!     .collect();
//! assert_eq!(blocks.len(), 3);
//! assert_eq!(&blocks[2].data[..], b"89");
//! # Ok::<(), blockrs::BlockError>(())
//! ```

use std::collections::VecDeque;
use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use super::BlockSink;
use crate::block::{Block, BlockHash};
use crate::buffer::{BlockBuffer, SegmentBuffer};
use crate::config::BlockConfig;
use crate::error::{BlockError, BoxError, BufferOp, Result};
use crate::state::{FlowFlags, FlowState};
use crate::util::{alloc_block, extend_with};

/// Per-block transform: receives the block bytes, returns the bytes to emit.
pub type Transform = Box<dyn FnMut(Bytes) -> std::result::Result<Bytes, BoxError> + Send>;

/// Per-block callback, invoked after the transform and before the sink.
pub type Callback = Box<dyn FnMut(&Block) + Send>;

/// Re-chunks a stream of writes into fixed-size blocks.
///
/// `BlockProcessor` owns a [`BlockBuffer`] (the accumulated bytes) and a
/// [`FlowState`] (the pause/end/drain flags). Both default to the in-process
/// implementations and can be injected through
/// [`BlockProcessor::with_parts`].
///
/// # Emission
///
/// A pass carves every complete block, then for each one in order applies
/// the transform, invokes the callback and hands the result to the sink. A
/// flush pass (from `flush()`, `end()`, or any pass once the stream has
/// ended) also emits the sub-block remainder, padded to full size when
/// partial emission is disabled.
///
/// A pass is skipped while paused, and a pass requested while one is already
/// running is a no-op.
///
/// # Errors
///
/// Buffer and transform failures go to [`BlockSink::on_error`], never back
/// through `write()`. A failing transform drops its block and stops the
/// current pass; blocks already emitted stay emitted and the blocks after it
/// stay queued for the next pass. The processor remains writable afterwards.
///
/// `write()` itself only fails with [`BlockError::WriteAfterEnd`].
///
/// # Backpressure
///
/// `write()` returns `false` when the producer should stop: either the
/// processor is paused, or the configured `max_buffered_blocks` emitted
/// blocks are still unacknowledged and complete blocks are waiting. The
/// sink's `on_drain` fires once the condition clears (`resume()` or
/// [`BlockProcessor::acknowledge`]). Drain only follows a `write()` that
/// returned `false`, and never follows `on_end`.
pub struct BlockProcessor<K, B = SegmentBuffer, S = FlowFlags> {
    config: BlockConfig,
    sink: K,
    buffer: B,
    state: S,
    staged: VecDeque<Bytes>,
    staged_len: usize,
    offset: u64,
    outstanding: usize,
    transform: Option<Transform>,
    callback: Option<Callback>,
}

impl<K: BlockSink> BlockProcessor<K> {
    /// Creates a processor with the default buffer and flag implementations.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::InvalidConfig`] if the configuration is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use blockrs::{BlockConfig, BlockProcessor, StreamEvent};
    ///
    /// let processor = BlockProcessor::new(BlockConfig::new(512)?, Vec::<StreamEvent>::new())?;
    /// assert_eq!(processor.config().block_size(), 512);
    /// # Ok::<(), blockrs::BlockError>(())
    /// ```
    pub fn new(config: BlockConfig, sink: K) -> Result<Self> {
        let buffer = SegmentBuffer::with_zero_fill(config.zero_fill());
        Self::with_parts(config, sink, buffer, FlowFlags::new())
    }
}

impl<K, B, S> BlockProcessor<K, B, S>
where
    K: BlockSink,
    B: BlockBuffer,
    S: FlowState,
{
    /// Creates a processor around caller-supplied buffer and flag stores.
    ///
    /// Passing `&mut` references lets two processors share one store in
    /// turn; the caller is then responsible for ordering between them.
    pub fn with_parts(config: BlockConfig, sink: K, buffer: B, state: S) -> Result<Self> {
        config.validate()?;
        debug!(
            block_size = config.block_size(),
            emit_partial = config.emit_partial(),
            max_buffered_blocks = ?config.max_buffered_blocks(),
            "block processor created"
        );

        Ok(Self {
            config,
            sink,
            buffer,
            state,
            staged: VecDeque::new(),
            staged_len: 0,
            offset: 0,
            outstanding: 0,
            transform: None,
            callback: None,
        })
    }

    /// Installs a per-block transform.
    ///
    /// The transform sees every emitted block, including the final short or
    /// padded one. If it fails, the block is dropped and the error is routed
    /// to the sink.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: FnMut(Bytes) -> std::result::Result<Bytes, BoxError> + Send + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Installs a per-block callback, run on each block before the sink sees it.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Block) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Writes data into the processor.
    ///
    /// Strings are taken as their UTF-8 bytes. Empty input is accepted and
    /// buffers nothing.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` - The caller may keep writing
    /// - `Ok(false)` - Backpressure: wait for the sink's `on_drain`
    ///
    /// # Errors
    ///
    /// [`BlockError::WriteAfterEnd`] once `end()` has been called. Nothing is
    /// buffered in that case.
    pub fn write(&mut self, data: impl Into<Bytes>) -> Result<bool> {
        if self.state.is_ended() {
            warn!("write after end rejected");
            return Err(BlockError::WriteAfterEnd);
        }

        self.buffer_segment(data.into());

        if self.buffered_len() < self.config.block_size() {
            return Ok(true);
        }

        if self.state.is_paused() {
            self.state.set_need_drain(true);
            return Ok(false);
        }

        self.emit(false);
        if self.stalled() {
            self.state.set_need_drain(true);
            return Ok(false);
        }
        Ok(true)
    }

    /// Copies borrowed bytes into the processor, then writes them.
    ///
    /// Use this for data that does not outlive the call, such as a read
    /// buffer or a `&String`. Owned [`Bytes`], `Vec<u8>`, `String` and
    /// `'static` slices can go through [`BlockProcessor::write`] without a
    /// copy.
    ///
    /// # Errors
    ///
    /// Same as [`BlockProcessor::write`].
    pub fn write_slice(&mut self, data: impl AsRef<[u8]>) -> Result<bool> {
        self.write(Bytes::copy_from_slice(data.as_ref()))
    }

    /// Suspends emission. Writes keep buffering.
    pub fn pause(&mut self) {
        if !self.state.is_paused() {
            debug!("paused");
        }
        self.state.set_paused(true);
    }

    /// Resumes emission, emitting whatever is ready, then signals drain if a
    /// producer was waiting.
    pub fn resume(&mut self) {
        if self.state.is_paused() {
            debug!("resumed");
        }
        self.state.set_paused(false);
        self.emit(false);
        self.maybe_drain();
    }

    /// Emits everything buffered, including a short final block.
    pub fn flush(&mut self) {
        self.emit(true);
    }

    /// Ends the stream: no more writes, flush, then `on_end`.
    ///
    /// Calling `end()` on an ended stream does nothing. If the processor is
    /// paused, the flush and `on_end` happen on `resume()`.
    pub fn end(&mut self) {
        self.end_with(Bytes::new());
    }

    /// Writes `data` as the final segment, then ends the stream.
    ///
    /// Does nothing (and drops `data`) if the stream has already ended.
    pub fn end_with(&mut self, data: impl Into<Bytes>) {
        if self.state.is_ended() {
            debug!("end called on an ended stream");
            return;
        }

        self.buffer_segment(data.into());
        self.state.set_ended(true);
        debug!(buffered = self.buffered_len(), "stream ending");
        self.emit(true);
    }

    /// Rewinds to a start-of-stream position.
    ///
    /// Drops every buffered and queued byte, zeroes the stream offset and
    /// outstanding-block count, and clears a pending drain. The paused and
    /// ended flags are kept.
    pub fn reset(&mut self) {
        debug!(dropped = self.buffered_len(), "reset");
        self.buffer.clear();
        self.staged.clear();
        self.staged_len = 0;
        self.offset = 0;
        self.outstanding = 0;
        self.state.set_need_drain(false);
    }

    /// Marks `count` emitted blocks as consumed downstream.
    ///
    /// Only meaningful with `max_buffered_blocks`: once below the cap,
    /// emission continues and a waiting producer gets `on_drain`.
    pub fn acknowledge(&mut self, count: usize) {
        self.outstanding = self.outstanding.saturating_sub(count);
        self.emit(false);
        self.maybe_drain();
    }

    /// Bytes held but not yet emitted (buffered plus carved-and-queued).
    pub fn buffered_len(&self) -> usize {
        self.buffer.total_len() + self.staged_len
    }

    /// Input-stream offset of the next block to be emitted.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Emitted blocks not yet acknowledged (counted only with a block cap).
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Returns true once `on_end` has fired.
    pub fn is_finished(&self) -> bool {
        self.state.is_end_emitted()
    }

    /// Returns true once `end()` has been called.
    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    /// Returns true while emission is paused.
    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Returns the configuration used by this processor.
    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    /// Returns the flow flags.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Returns the buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Returns the sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Returns the sink mutably, e.g. to drain recorded events.
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Consumes the processor and returns the sink.
    pub fn into_sink(self) -> K {
        self.sink
    }

    fn buffer_segment(&mut self, segment: Bytes) {
        if segment.is_empty() {
            return;
        }
        if let Err(err) = self.buffer.add_buffer(segment) {
            self.report(BlockError::buffer(BufferOp::Add, err));
        }
    }

    /// Runs one emission pass unless paused or already inside one.
    fn emit(&mut self, flush: bool) {
        if self.state.is_emitting() || self.state.is_paused() {
            return;
        }

        self.state.set_emitting(true);
        let flush = flush || self.state.is_ended();
        let result = self.run_pass(flush);
        self.state.set_emitting(false);

        if let Err(err) = result {
            self.report(err);
        }
        self.after_pass();
    }

    fn run_pass(&mut self, flush: bool) -> Result<()> {
        let block_size = self.config.block_size();
        let carved = self
            .buffer
            .chunks(block_size)
            .map_err(|err| BlockError::buffer(BufferOp::Chunks, err))?;
        for data in carved {
            self.staged_len += data.len();
            self.staged.push_back(data);
        }

        let mut emitted = 0usize;
        while !self.staged.is_empty() {
            if self.at_capacity() {
                trace!(emitted, queued = self.staged.len(), "block cap reached");
                return Ok(());
            }
            let Some(data) = self.staged.pop_front() else {
                break;
            };
            self.staged_len -= data.len();
            let len = data.len();
            self.deliver(data, len)?;
            emitted += 1;
        }

        if flush && self.buffer.total_len() > 0 {
            if self.at_capacity() {
                return Ok(());
            }
            let rest = self
                .buffer
                .remaining()
                .map_err(|err| BlockError::buffer(BufferOp::Remaining, err))?;
            self.buffer.clear();
            if let Some(rest) = rest {
                let len = rest.len();
                let data = self.finish_block(rest);
                self.deliver(data, len)?;
                emitted += 1;
            }
        }

        trace!(emitted, flush, buffered = self.buffered_len(), "emission pass done");
        Ok(())
    }

    /// Pads a short final block when partial emission is off.
    fn finish_block(&self, rest: Bytes) -> Bytes {
        let block_size = self.config.block_size();
        if self.config.emit_partial() || rest.len() >= block_size {
            return rest;
        }

        let mut block = alloc_block(block_size, self.config.zero_fill());
        block.extend_from_slice(&rest);
        let padding = self.config.padding();
        extend_with(&mut block, block_size - rest.len(), |i| {
            padding.byte_at(i).unwrap_or_default()
        });
        block.freeze()
    }

    /// Transforms, hashes and hands one block to the sink.
    ///
    /// `input_len` is the number of input bytes the block covers, which
    /// differs from `data.len()` for padded blocks.
    fn deliver(&mut self, data: Bytes, input_len: usize) -> Result<()> {
        let offset = self.offset;
        self.offset += input_len as u64;

        let data = match self.transform.as_mut() {
            Some(transform) => {
                transform(data).map_err(|source| BlockError::Transform { offset, source })?
            }
            None => data,
        };

        let hash = self.compute_hash(&data);
        let block = Block {
            data,
            offset: Some(offset),
            hash,
        };

        if let Some(callback) = self.callback.as_mut() {
            callback(&block);
        }

        if self.config.max_buffered_blocks().is_some() {
            self.outstanding += 1;
        }
        trace!(offset, len = block.len(), "block emitted");
        self.sink.on_block(block);
        Ok(())
    }

    /// Computes hash for the given data if hashing is enabled.
    fn compute_hash(&self, data: &[u8]) -> Option<BlockHash> {
        if !self.config.hash_config().enabled {
            return None;
        }
        #[cfg(not(feature = "hash-blake3"))]
        let _ = data;
        #[cfg(feature = "hash-blake3")]
        return Some(crate::hash::Blake3Hasher::hash(data));
        #[cfg(not(feature = "hash-blake3"))]
        return None;
    }

    fn at_capacity(&self) -> bool {
        self.config
            .max_buffered_blocks()
            .is_some_and(|max| self.outstanding >= max)
    }

    /// True when the block cap holds back complete blocks.
    fn stalled(&self) -> bool {
        self.at_capacity()
            && (!self.staged.is_empty() || self.buffer.total_len() >= self.config.block_size())
    }

    fn after_pass(&mut self) {
        self.maybe_drain();

        if self.state.is_ended() && !self.state.is_end_emitted() && self.buffered_len() == 0 {
            self.state.set_end_emitted(true);
            self.state.set_need_drain(false);
            debug!(offset = self.offset, "stream ended");
            self.sink.on_end();
        }
    }

    fn maybe_drain(&mut self) {
        if self.state.needs_drain()
            && !self.state.is_paused()
            && !self.state.is_end_emitted()
            && !self.at_capacity()
        {
            self.state.set_need_drain(false);
            trace!("drain");
            self.sink.on_drain();
        }
    }

    fn report(&mut self, err: BlockError) {
        warn!(error = %err, "block processing failed");
        self.sink.on_error(err);
    }
}

impl<K: fmt::Debug, B: fmt::Debug, S: fmt::Debug> fmt::Debug for BlockProcessor<K, B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockProcessor")
            .field("config", &self.config)
            .field("sink", &self.sink)
            .field("buffer", &self.buffer)
            .field("state", &self.state)
            .field("staged_len", &self.staged_len)
            .field("offset", &self.offset)
            .field("outstanding", &self.outstanding)
            .field("transform", &self.transform.is_some())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
