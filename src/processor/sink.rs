//! Downstream event contract.

use std::collections::VecDeque;

use crate::block::Block;
use crate::error::BlockError;

/// Receives the processor's events: data, drain, end and error.
///
/// Events arrive synchronously from inside the processor call that caused
/// them, in emission order. `on_end` fires at most once, after the last
/// `on_block`.
pub trait BlockSink {
    /// A block was emitted.
    fn on_block(&mut self, block: Block);

    /// Backpressure cleared; a producer that saw `write` return `false` may
    /// resume.
    fn on_drain(&mut self) {}

    /// The stream ended and every buffered byte was emitted.
    fn on_end(&mut self) {}

    /// A buffer or transform failure. The processor stays usable.
    fn on_error(&mut self, error: BlockError);
}

/// A recorded sink event.
#[derive(Debug)]
pub enum StreamEvent {
    /// See [`BlockSink::on_block`].
    Data(Block),
    /// See [`BlockSink::on_drain`].
    Drain,
    /// See [`BlockSink::on_end`].
    End,
    /// See [`BlockSink::on_error`].
    Error(BlockError),
}

impl StreamEvent {
    /// Returns the block if this is a data event.
    pub fn into_block(self) -> Option<Block> {
        match self {
            StreamEvent::Data(block) => Some(block),
            _ => None,
        }
    }

    /// Returns true for data events.
    pub fn is_data(&self) -> bool {
        matches!(self, StreamEvent::Data(_))
    }
}

impl BlockSink for Vec<StreamEvent> {
    fn on_block(&mut self, block: Block) {
        self.push(StreamEvent::Data(block));
    }

    fn on_drain(&mut self) {
        self.push(StreamEvent::Drain);
    }

    fn on_end(&mut self) {
        self.push(StreamEvent::End);
    }

    fn on_error(&mut self, error: BlockError) {
        self.push(StreamEvent::Error(error));
    }
}

impl BlockSink for VecDeque<StreamEvent> {
    fn on_block(&mut self, block: Block) {
        self.push_back(StreamEvent::Data(block));
    }

    fn on_drain(&mut self) {
        self.push_back(StreamEvent::Drain);
    }

    fn on_end(&mut self) {
        self.push_back(StreamEvent::End);
    }

    fn on_error(&mut self, error: BlockError) {
        self.push_back(StreamEvent::Error(error));
    }
}

impl<T: BlockSink + ?Sized> BlockSink for &mut T {
    fn on_block(&mut self, block: Block) {
        (**self).on_block(block)
    }

    fn on_drain(&mut self) {
        (**self).on_drain()
    }

    fn on_end(&mut self) {
        (**self).on_end()
    }

    fn on_error(&mut self, error: BlockError) {
        (**self).on_error(error)
    }
}
