//! Flow-control flags.
//!
//! - [`FlowState`] - The state-manager seam used by the processor
//! - [`FlowFlags`] - Default in-memory implementation

/// Five independent lifecycle and flow-control flags.
///
/// This is an unconstrained bag of booleans: setters accept any value and no
/// flag implies another. The processor is responsible for interpreting them
/// (for instance, it never clears `ended` once set).
pub trait FlowState {
    /// Emission is suspended; writes still buffer.
    fn is_paused(&self) -> bool;
    /// Sets the paused flag.
    fn set_paused(&mut self, paused: bool);

    /// No further writes are accepted.
    fn is_ended(&self) -> bool;
    /// Sets the ended flag.
    fn set_ended(&mut self, ended: bool);

    /// The terminal event has fired.
    fn is_end_emitted(&self) -> bool;
    /// Sets the end-emitted flag.
    fn set_end_emitted(&mut self, end_emitted: bool);

    /// An emission pass is running.
    fn is_emitting(&self) -> bool;
    /// Sets the emitting flag.
    fn set_emitting(&mut self, emitting: bool);

    /// A producer saw backpressure and is waiting for a drain signal.
    fn needs_drain(&self) -> bool;
    /// Sets the need-drain flag.
    fn set_need_drain(&mut self, need_drain: bool);
}

/// Plain-field [`FlowState`]; all flags start cleared.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlowFlags {
    paused: bool,
    ended: bool,
    end_emitted: bool,
    emitting: bool,
    need_drain: bool,
}

impl FlowFlags {
    /// Creates a new set of cleared flags.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowState for FlowFlags {
    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn set_ended(&mut self, ended: bool) {
        self.ended = ended;
    }

    fn is_end_emitted(&self) -> bool {
        self.end_emitted
    }

    fn set_end_emitted(&mut self, end_emitted: bool) {
        self.end_emitted = end_emitted;
    }

    fn is_emitting(&self) -> bool {
        self.emitting
    }

    fn set_emitting(&mut self, emitting: bool) {
        self.emitting = emitting;
    }

    fn needs_drain(&self) -> bool {
        self.need_drain
    }

    fn set_need_drain(&mut self, need_drain: bool) {
        self.need_drain = need_drain;
    }
}

impl<T: FlowState + ?Sized> FlowState for &mut T {
    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }

    fn set_paused(&mut self, paused: bool) {
        (**self).set_paused(paused)
    }

    fn is_ended(&self) -> bool {
        (**self).is_ended()
    }

    fn set_ended(&mut self, ended: bool) {
        (**self).set_ended(ended)
    }

    fn is_end_emitted(&self) -> bool {
        (**self).is_end_emitted()
    }

    fn set_end_emitted(&mut self, end_emitted: bool) {
        (**self).set_end_emitted(end_emitted)
    }

    fn is_emitting(&self) -> bool {
        (**self).is_emitting()
    }

    fn set_emitting(&mut self, emitting: bool) {
        (**self).set_emitting(emitting)
    }

    fn needs_drain(&self) -> bool {
        (**self).needs_drain()
    }

    fn set_need_drain(&mut self, need_drain: bool) {
        (**self).set_need_drain(need_drain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_all_clear() {
        let flags = FlowFlags::new();
        assert!(!flags.is_paused());
        assert!(!flags.is_ended());
        assert!(!flags.is_end_emitted());
        assert!(!flags.is_emitting());
        assert!(!flags.needs_drain());
    }

    #[test]
    fn test_flags_are_independent() {
        let mut flags = FlowFlags::new();
        flags.set_ended(true);
        assert!(flags.is_ended());
        assert!(!flags.is_end_emitted());
        assert!(!flags.is_paused());

        flags.set_need_drain(true);
        flags.set_paused(true);
        flags.set_paused(false);
        assert!(flags.needs_drain());
    }

    #[test]
    fn test_setters_accept_any_value() {
        let mut flags = FlowFlags::new();
        flags.set_ended(true);
        flags.set_ended(false);
        assert!(!flags.is_ended());
        flags.set_emitting(true);
        flags.set_emitting(true);
        assert!(flags.is_emitting());
    }
}
