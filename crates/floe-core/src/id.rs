//! Strongly-typed indices into a sliced buffer.

use std::fmt;

use crate::error::{BufferError, IndexKind};

/// Global position of an element in `[0, element_count)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementIndex(pub u64);

impl fmt::Display for ElementIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ElementIndex {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl TryFrom<i64> for ElementIndex {
    type Error = BufferError;

    /// Negative positions are rejected the same way as positions past the end.
    fn try_from(v: i64) -> Result<Self, Self::Error> {
        u64::try_from(v)
            .map(Self)
            .map_err(|_| BufferError::negative(IndexKind::Element, v))
    }
}

/// Position of a slice in `[0, slice_count)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SliceIndex(pub usize);

impl fmt::Display for SliceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for SliceIndex {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

impl TryFrom<i64> for SliceIndex {
    type Error = BufferError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        usize::try_from(v)
            .map(Self)
            .map_err(|_| BufferError::negative(IndexKind::Slice, v))
    }
}

/// Where a global element index lives: which slice, and how far into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SliceCoord {
    /// The owning slice.
    pub slice: SliceIndex,
    /// Element offset within that slice.
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_signed_indices_convert() {
        assert_eq!(ElementIndex::try_from(7i64), Ok(ElementIndex(7)));
        assert_eq!(SliceIndex::try_from(0i64), Ok(SliceIndex(0)));
    }

    #[test]
    fn negative_indices_are_out_of_range() {
        assert!(matches!(
            ElementIndex::try_from(-1i64),
            Err(BufferError::OutOfRange {
                kind: IndexKind::Element,
                ..
            })
        ));
        assert!(matches!(
            SliceIndex::try_from(-3i64),
            Err(BufferError::OutOfRange {
                kind: IndexKind::Slice,
                ..
            })
        ));
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(ElementIndex(42).to_string(), "42");
        assert_eq!(SliceIndex(3).to_string(), "3");
    }
}
