//! Error types for sliced buffers.
//!
//! [`ConfigError`] covers everything rejected before any memory is
//! requested. [`BufferError`] is what every fallible buffer operation
//! returns; configuration failures are folded into it as
//! [`BufferError::InvalidConfiguration`].

use std::fmt;

use thiserror::Error;

use crate::id::SliceIndex;

/// Which index space an out-of-range index was checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// A global element index.
    Element,
    /// A slice index.
    Slice,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => write!(f, "element"),
            Self::Slice => write!(f, "slice"),
        }
    }
}

/// The allocator collaborator refused a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("allocator refused {size} bytes at alignment {align}")]
pub struct AllocError {
    /// Requested size in bytes.
    pub size: usize,
    /// Requested alignment in bytes.
    pub align: usize,
}

/// Invalid buffer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_slice_size` is zero.
    #[error("max_slice_size must be at least 1 byte")]
    ZeroMaxSliceSize,
    /// `max_slice_size` exceeds what a single allocation may request.
    #[error("max_slice_size {max_slice_size} exceeds isize::MAX")]
    MaxSliceSizeTooLarge {
        /// The configured value.
        max_slice_size: usize,
    },
    /// The element type occupies zero bytes.
    #[error("zero-sized element types cannot be stored")]
    ZeroSizedElement,
    /// A single element does not fit in one slice.
    #[error("element size {element_size} exceeds max_slice_size {max_slice_size}")]
    ElementTooLarge {
        /// Size of one element in bytes.
        element_size: usize,
        /// The configured maximum slice size.
        max_slice_size: usize,
    },
    /// `element_count * element_size` does not fit in `u64`.
    #[error("{element_count} elements of {element_size} bytes overflow u64")]
    SizeOverflow {
        /// Requested element count.
        element_count: u64,
        /// Size of one element in bytes.
        element_size: usize,
    },
    /// A dedicated executor pool could not be built.
    #[error("executor pool could not be built: {reason}")]
    ThreadPool {
        /// Description from the pool builder.
        reason: String,
    },
}

/// Errors reported by sliced buffer operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BufferError {
    /// An element index `>= element_count`, a slice index `>= slice_count`,
    /// or a negative index. Never clamped.
    #[error("{kind} index {index} is out of range{}", describe_bound(.bound))]
    OutOfRange {
        /// Which index space was checked.
        kind: IndexKind,
        /// The rejected index. Signed so negative inputs are reported verbatim.
        index: i128,
        /// Exclusive upper bound of the index space, if known.
        bound: Option<u64>,
    },
    /// A slice allocation failed during construction. All slices
    /// allocated before it have already been released.
    #[error("allocation of slice {slice} ({bytes} bytes) failed")]
    AllocationFailure {
        /// The slice whose allocation failed.
        slice: SliceIndex,
        /// Bytes requested for that slice.
        bytes: usize,
        /// The allocator's refusal.
        #[source]
        source: AllocError,
    },
    /// A data operation was attempted after the buffer was disposed.
    #[error("buffer has been disposed")]
    UseAfterDispose,
    /// The buffer configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

impl BufferError {
    /// Out-of-range error for `index` checked against `[0, bound)`.
    pub fn out_of_range(kind: IndexKind, index: u64, bound: u64) -> Self {
        Self::OutOfRange {
            kind,
            index: i128::from(index),
            bound: Some(bound),
        }
    }

    /// Out-of-range error for a negative index.
    pub fn negative(kind: IndexKind, index: i64) -> Self {
        Self::OutOfRange {
            kind,
            index: i128::from(index),
            bound: None,
        }
    }
}

fn describe_bound(bound: &Option<u64>) -> String {
    match bound {
        Some(bound) => format!(" (must be < {bound})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn out_of_range_display_names_kind_and_bound() {
        let err = BufferError::out_of_range(IndexKind::Element, 10, 10);
        assert_eq!(
            err.to_string(),
            "element index 10 is out of range (must be < 10)"
        );
    }

    #[test]
    fn negative_index_display_has_no_bound() {
        let err = BufferError::negative(IndexKind::Slice, -1);
        assert_eq!(err.to_string(), "slice index -1 is out of range");
    }

    #[test]
    fn allocation_failure_exposes_allocator_source() {
        let err = BufferError::AllocationFailure {
            slice: SliceIndex(2),
            bytes: 64,
            source: AllocError { size: 64, align: 8 },
        };
        assert!(err.to_string().contains("slice 2"));
        let source = err.source().expect("source is chained");
        assert!(source.to_string().contains("64 bytes"));
    }

    #[test]
    fn config_error_converts_into_buffer_error() {
        let err: BufferError = ConfigError::ZeroMaxSliceSize.into();
        assert_eq!(
            err,
            BufferError::InvalidConfiguration(ConfigError::ZeroMaxSliceSize)
        );
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
