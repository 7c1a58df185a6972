//! Buffer configuration parameters.

use crate::error::ConfigError;

/// Configuration for a sliced buffer.
///
/// Fixed per buffer instance: the layout is planned once at construction
/// against these values and never re-planned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferConfig {
    /// Upper bound on the byte size of a single slice allocation.
    ///
    /// Default: 268_435_456 (256 MiB). Must be at least the element size.
    pub max_slice_size: usize,

    /// Number of worker threads for bulk operations. `None` = use the
    /// process-wide pool.
    ///
    /// Explicit values are clamped to `[1, 256]` by
    /// [`resolved_worker_count`](Self::resolved_worker_count).
    pub worker_count: Option<usize>,
}

impl BufferConfig {
    /// Default maximum slice size: 256 MiB.
    pub const DEFAULT_MAX_SLICE_SIZE: usize = 256 * 1024 * 1024;

    /// Upper clamp for an explicit worker count.
    pub const MAX_WORKERS: usize = 256;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            max_slice_size: Self::DEFAULT_MAX_SLICE_SIZE,
            worker_count: None,
        }
    }

    /// Replace the maximum slice size.
    pub fn with_max_slice_size(mut self, max_slice_size: usize) -> Self {
        self.max_slice_size = max_slice_size;
        self
    }

    /// Request a dedicated pool of `workers` threads.
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = Some(workers);
        self
    }

    /// The explicit worker count after clamping, or `None` for the shared pool.
    pub fn resolved_worker_count(&self) -> Option<usize> {
        self.worker_count.map(|n| n.clamp(1, Self::MAX_WORKERS))
    }

    /// Check that elements of `element_size` bytes can be laid out.
    pub fn validate(&self, element_size: usize) -> Result<(), ConfigError> {
        if self.max_slice_size == 0 {
            return Err(ConfigError::ZeroMaxSliceSize);
        }
        if self.max_slice_size > isize::MAX as usize {
            return Err(ConfigError::MaxSliceSizeTooLarge {
                max_slice_size: self.max_slice_size,
            });
        }
        if element_size == 0 {
            return Err(ConfigError::ZeroSizedElement);
        }
        if element_size > self.max_slice_size {
            return Err(ConfigError::ElementTooLarge {
                element_size,
                max_slice_size: self.max_slice_size,
            });
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new()
    }
}
