//! Configuration for segment pooling.
//!
//! - [`PoolConfig`] - Byte budget of a [`SegmentPool`](crate::SegmentPool)'s free list
//!
//! # Example
//!
//! ```
//! use segbuf::{PoolConfig, SegmentPool, SEGMENT_SIZE};
//!
//! // Keep at most 4 idle segments around
//! let config = PoolConfig::new(4 * SEGMENT_SIZE)?;
//! let pool = SegmentPool::new(config);
//! assert_eq!(pool.config().max_size(), 4 * SEGMENT_SIZE);
//!
//! # Ok::<(), segbuf::BufError>(())
//! ```

use crate::error::BufError;
use crate::segment::SEGMENT_SIZE;

/// Default pool budget (64 KiB, eight segments).
pub const DEFAULT_MAX_POOL_SIZE: usize = 64 * 1024;

/// Configuration for a segment pool.
///
/// `max_size` caps the number of bytes held by idle segments. Segments
/// recycled while the pool is at its cap are dropped and their memory is
/// returned to the allocator. A budget of zero disables pooling.
///
/// # Size Constraints
///
/// `max_size` must be a multiple of [`SEGMENT_SIZE`].
///
/// # Example
///
/// ```
/// use segbuf::{PoolConfig, SEGMENT_SIZE};
///
/// let config = PoolConfig::default().with_max_size(2 * SEGMENT_SIZE);
/// assert!(config.validate().is_ok());
///
/// let config = PoolConfig::default().with_max_size(100);
/// assert!(config.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    /// Maximum number of bytes held by idle segments.
    max_size: usize,
}

impl PoolConfig {
    /// Creates a new configuration with the given byte budget.
    ///
    /// # Errors
    ///
    /// Returns [`BufError::InvalidConfig`] if `max_size` is not a multiple of
    /// [`SEGMENT_SIZE`].
    pub fn new(max_size: usize) -> Result<Self, BufError> {
        if max_size % SEGMENT_SIZE != 0 {
            return Err(BufError::InvalidConfig {
                message: "max_size must be a multiple of SEGMENT_SIZE",
            });
        }

        Ok(Self { max_size })
    }

    /// A configuration that never keeps recycled segments.
    pub const fn disabled() -> Self {
        Self { max_size: 0 }
    }

    /// Sets the byte budget.
    ///
    /// Note: This does not validate the configuration. Use [`PoolConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Returns the byte budget.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns how many idle segments fit in the budget.
    pub fn max_segments(&self) -> usize {
        self.max_size / SEGMENT_SIZE
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), BufError> {
        Self::new(self.max_size).map(|_| ())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_POOL_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PoolConfig::default();
        assert_eq!(config.max_size(), DEFAULT_MAX_POOL_SIZE);
        assert_eq!(config.max_segments(), 8);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PoolConfig::default().with_max_size(3 * SEGMENT_SIZE);
        assert_eq!(config.max_segments(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_not_segment_multiple() {
        let result = PoolConfig::new(SEGMENT_SIZE + 1);
        assert!(matches!(result, Err(BufError::InvalidConfig { .. })));
    }

    #[test]
    fn test_disabled() {
        let config = PoolConfig::disabled();
        assert_eq!(config.max_size(), 0);
        assert!(config.validate().is_ok());
    }
}
