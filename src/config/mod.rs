//! Configuration for block emission.
//!
//! - [`BlockConfig`] - Block size, partial/padding policy, allocation and backpressure knobs
//! - [`Padding`] - Fill source for the final incomplete block
//! - [`HashConfig`] - Hash computation control

use bytes::Bytes;

use crate::error::BlockError;

/// Default block size (64 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Default padding byte.
pub const DEFAULT_PADDING_BYTE: u8 = 0;

/// Source of fill bytes for the final block when partial emission is off.
///
/// A pattern is applied cyclically from its first byte at the first unfilled
/// position of the block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Padding {
    /// A single repeated byte.
    Byte(u8),
    /// A byte pattern repeated from index 0.
    Pattern(Bytes),
}

impl Padding {
    /// Creates a pattern padding from anything convertible to [`Bytes`].
    pub fn pattern(pattern: impl Into<Bytes>) -> Self {
        Self::Pattern(pattern.into())
    }

    /// Returns the fill byte for the `i`-th padded position.
    ///
    /// Returns `None` only for an empty pattern, which
    /// [`BlockConfig::validate`] rejects.
    pub fn byte_at(&self, i: usize) -> Option<u8> {
        match self {
            Padding::Byte(b) => Some(*b),
            Padding::Pattern(p) => i.checked_rem(p.len()).map(|j| p[j]),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::Byte(DEFAULT_PADDING_BYTE)
    }
}

impl From<u8> for Padding {
    fn from(b: u8) -> Self {
        Self::Byte(b)
    }
}

/// Configuration for fixed-size block emission.
///
/// Only `block_size` is required. Everything else has a default:
///
/// - `emit_partial`: `true` - the final short block is emitted as is
/// - `padding`: `Padding::Byte(0)` - used only when `emit_partial` is off
/// - `zero_fill`: `false` - fresh blocks are reserved, not zeroed, before filling
/// - `max_buffered_blocks`: `None` - no cap on unacknowledged blocks
/// - `hash_config`: disabled
///
/// # Example
///
/// ```
/// use blockrs::{BlockConfig, Padding};
///
/// let config = BlockConfig::new(4096)?
///     .with_emit_partial(false)
///     .with_padding(Padding::Byte(0xFF));
/// assert_eq!(config.block_size(), 4096);
/// # Ok::<(), blockrs::BlockError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockConfig {
    block_size: usize,
    emit_partial: bool,
    padding: Padding,
    zero_fill: bool,
    max_buffered_blocks: Option<usize>,
    hash_config: HashConfig,
}

impl BlockConfig {
    /// Creates a new configuration with the given block size.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::InvalidConfig`] if `block_size` is zero.
    pub fn new(block_size: usize) -> Result<Self, BlockError> {
        let config = Self {
            block_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the block size.
    ///
    /// Note: This does not validate the configuration. Use [`BlockConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Sets whether a short final block is emitted unpadded.
    pub fn with_emit_partial(mut self, emit_partial: bool) -> Self {
        self.emit_partial = emit_partial;
        self
    }

    /// Sets the padding source used when partial emission is disabled.
    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    /// Sets whether freshly allocated blocks are zero-initialised.
    pub fn with_zero_fill(mut self, zero_fill: bool) -> Self {
        self.zero_fill = zero_fill;
        self
    }

    /// Caps the number of emitted blocks that may be outstanding.
    pub fn with_max_buffered_blocks(mut self, max: Option<usize>) -> Self {
        self.max_buffered_blocks = max;
        self
    }

    /// Sets the hash configuration.
    pub fn with_hash_config(mut self, config: HashConfig) -> Self {
        self.hash_config = config;
        self
    }

    /// Returns the block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns whether a short final block is emitted unpadded.
    pub fn emit_partial(&self) -> bool {
        self.emit_partial
    }

    /// Returns the padding source.
    pub fn padding(&self) -> &Padding {
        &self.padding
    }

    /// Returns whether fresh blocks are zero-initialised.
    pub fn zero_fill(&self) -> bool {
        self.zero_fill
    }

    /// Returns the outstanding block cap, if any.
    pub fn max_buffered_blocks(&self) -> Option<usize> {
        self.max_buffered_blocks
    }

    /// Returns the hash configuration.
    pub fn hash_config(&self) -> &HashConfig {
        &self.hash_config
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), BlockError> {
        if self.block_size == 0 {
            return Err(BlockError::InvalidConfig {
                message: "block size must be a positive integer",
            });
        }

        if let Padding::Pattern(p) = &self.padding {
            if p.is_empty() {
                return Err(BlockError::InvalidConfig {
                    message: "padding pattern must not be empty",
                });
            }
        }

        if self.max_buffered_blocks == Some(0) {
            return Err(BlockError::InvalidConfig {
                message: "max_buffered_blocks must be at least 1",
            });
        }

        Ok(())
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            emit_partial: true,
            padding: Padding::default(),
            zero_fill: false,
            max_buffered_blocks: None,
            hash_config: HashConfig::default(),
        }
    }
}

/// Configuration for block hashing.
///
/// Controls whether BLAKE3 hashes are computed for each emitted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashConfig {
    /// Whether to compute BLAKE3 hashes.
    pub enabled: bool,
}

impl HashConfig {
    /// Creates a new hash configuration.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enables hashing.
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Disables hashing.
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self { enabled: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_config_default() {
        let config = BlockConfig::default();
        assert_eq!(config.block_size(), 64 * 1024);
        assert!(config.emit_partial());
        assert_eq!(config.padding(), &Padding::Byte(0));
        assert!(!config.zero_fill());
        assert_eq!(config.max_buffered_blocks(), None);
        assert!(!config.hash_config().enabled);
    }

    #[test]
    fn test_block_config_builder() {
        let config = BlockConfig::default()
            .with_block_size(512)
            .with_emit_partial(false)
            .with_padding(b'P')
            .with_zero_fill(true)
            .with_max_buffered_blocks(Some(3));
        assert_eq!(config.block_size(), 512);
        assert!(!config.emit_partial());
        assert_eq!(config.padding(), &Padding::Byte(b'P'));
        assert!(config.zero_fill());
        assert_eq!(config.max_buffered_blocks(), Some(3));
    }

    #[test]
    fn test_block_config_invalid_zero() {
        assert!(BlockConfig::new(0).is_err());
        assert!(BlockConfig::new(1).is_ok());
    }

    #[test]
    fn test_block_config_validate() {
        let config = BlockConfig::default().with_block_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let config = BlockConfig::default().with_padding(Padding::pattern(Bytes::new()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_block_cap_rejected() {
        let config = BlockConfig::default().with_max_buffered_blocks(Some(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pattern_wraps_from_first_byte() {
        let padding = Padding::pattern(&b"XYZ"[..]);
        let fill: Vec<u8> = (0..5).filter_map(|i| padding.byte_at(i)).collect();
        assert_eq!(fill, b"XYZXY");
        assert_eq!(Padding::Byte(7).byte_at(100), Some(7));
    }

    #[test]
    fn test_empty_pattern_has_no_fill_byte() {
        let padding = Padding::pattern("");
        assert_eq!(padding.byte_at(0), None);
        assert_eq!(padding.byte_at(3), None);
    }

    #[test]
    fn test_hash_config() {
        assert!(!HashConfig::default().enabled);
        assert!(HashConfig::enabled().enabled);
        assert!(!HashConfig::disabled().enabled);
        assert!(HashConfig::new(true).enabled);
    }
}
