//! The layout planner.
//!
//! A [`SliceLayout`] is pure arithmetic over `(element_count,
//! element_size, max_slice_size)`. It is computed once when a buffer is
//! constructed and consulted by every later operation, including after
//! disposal: none of its methods allocate or mutate.
//!
//! ```text
//! global index:  0 ............ P-1 | P ........... 2P-1 | 2P ..... N-1
//! slice:         0 (P elements)     | 1 (P elements)     | 2 (N - 2P)
//! ```
//!
//! where `P = max_slice_size / element_size` (floor) and `N` is the
//! element count. Every slice but the last is full.

use std::ops::Range;

use crate::config::BufferConfig;
use crate::element::Element;
use crate::error::{BufferError, ConfigError, IndexKind};
use crate::id::{ElementIndex, SliceCoord, SliceIndex};

/// Anything that identifies a slice: a [`SliceIndex`] directly, or an
/// [`ElementIndex`] resolved to the slice that owns it.
pub trait SliceLocator: Copy {
    /// Resolve to a bounds-checked slice index.
    fn locate(self, layout: &SliceLayout) -> Result<SliceIndex, BufferError>;
}

impl SliceLocator for SliceIndex {
    fn locate(self, layout: &SliceLayout) -> Result<SliceIndex, BufferError> {
        layout.check_slice(self)?;
        Ok(self)
    }
}

impl SliceLocator for ElementIndex {
    fn locate(self, layout: &SliceLayout) -> Result<SliceIndex, BufferError> {
        layout.slice_of(self)
    }
}

/// Deterministic partition of `element_count` elements into slices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceLayout {
    element_count: u64,
    element_size: usize,
    max_slice_size: usize,
    /// Elements in every slice except the last. Always `>= 1`.
    elements_per_full_slice: u64,
    slice_count: usize,
}

impl SliceLayout {
    /// Plan the layout for `element_count` elements of `element_size` bytes.
    ///
    /// `element_count == 0` yields a layout with zero slices.
    pub fn plan(
        element_count: u64,
        element_size: usize,
        config: &BufferConfig,
    ) -> Result<Self, ConfigError> {
        config.validate(element_size)?;

        let overflow = || ConfigError::SizeOverflow {
            element_count,
            element_size,
        };
        element_count
            .checked_mul(element_size as u64)
            .ok_or_else(overflow)?;

        let elements_per_full_slice = (config.max_slice_size / element_size) as u64;
        let slice_count = usize::try_from(element_count.div_ceil(elements_per_full_slice))
            .map_err(|_| overflow())?;

        Ok(Self {
            element_count,
            element_size,
            max_slice_size: config.max_slice_size,
            elements_per_full_slice,
            slice_count,
        })
    }

    /// Plan the layout for `element_count` values of `T`.
    pub fn for_element<T: Element>(
        element_count: u64,
        config: &BufferConfig,
    ) -> Result<Self, ConfigError> {
        Self::plan(element_count, std::mem::size_of::<T>(), config)
    }

    /// Number of logical elements.
    pub fn element_count(&self) -> u64 {
        self.element_count
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Total bytes across all slices: `element_count * element_size`.
    pub fn binary_size(&self) -> u64 {
        // Checked in `plan`.
        self.element_count * self.element_size as u64
    }

    /// The maximum slice size this layout was planned against.
    pub fn max_slice_size(&self) -> usize {
        self.max_slice_size
    }

    /// Number of slices. Zero iff the element count is zero.
    pub fn slice_count(&self) -> usize {
        self.slice_count
    }

    /// Elements held by every slice except the last.
    pub fn elements_per_full_slice(&self) -> u64 {
        self.elements_per_full_slice
    }

    /// Fail with `OutOfRange` unless `slice < slice_count`.
    pub fn check_slice(&self, slice: SliceIndex) -> Result<(), BufferError> {
        if slice.0 < self.slice_count {
            Ok(())
        } else {
            Err(BufferError::out_of_range(
                IndexKind::Slice,
                slice.0 as u64,
                self.slice_count as u64,
            ))
        }
    }

    /// Fail with `OutOfRange` unless `index < element_count`.
    pub fn check_element(&self, index: ElementIndex) -> Result<(), BufferError> {
        if index.0 < self.element_count {
            Ok(())
        } else {
            Err(BufferError::out_of_range(
                IndexKind::Element,
                index.0,
                self.element_count,
            ))
        }
    }

    /// The slice that owns element `index`.
    pub fn slice_of(&self, index: ElementIndex) -> Result<SliceIndex, BufferError> {
        self.check_element(index)?;
        Ok(SliceIndex((index.0 / self.elements_per_full_slice) as usize))
    }

    /// Resolve a global element index to `(slice, local offset)`.
    pub fn to_slice_coordinates(&self, index: ElementIndex) -> Result<SliceCoord, BufferError> {
        let slice = self.slice_of(index)?;
        Ok(SliceCoord {
            slice,
            offset: (index.0 % self.elements_per_full_slice) as usize,
        })
    }

    /// Number of elements in the slice identified by `at`.
    pub fn slice_size<L: SliceLocator>(&self, at: L) -> Result<usize, BufferError> {
        let slice = at.locate(self)?;
        Ok(self.len_of(slice))
    }

    /// Byte size of the slice identified by `at`.
    pub fn binary_slice_size<L: SliceLocator>(&self, at: L) -> Result<usize, BufferError> {
        Ok(self.slice_size(at)? * self.element_size)
    }

    /// Global element range `[start, end)` covered by the slice `at`.
    pub fn slice_range<L: SliceLocator>(&self, at: L) -> Result<Range<u64>, BufferError> {
        let slice = at.locate(self)?;
        let start = slice.0 as u64 * self.elements_per_full_slice;
        Ok(start..start + self.len_of(slice) as u64)
    }

    /// Element counts of every slice, in order.
    pub fn slice_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.slice_count).map(|i| self.len_of(SliceIndex(i)))
    }

    /// Length of an already bounds-checked slice.
    ///
    /// Never exceeds `elements_per_full_slice`, which came from a `usize`
    /// division, so the narrowing cast is lossless.
    fn len_of(&self, slice: SliceIndex) -> usize {
        if slice.0 + 1 < self.slice_count {
            self.elements_per_full_slice as usize
        } else {
            (self.element_count - slice.0 as u64 * self.elements_per_full_slice) as usize
        }
    }
}
