//! The process allocator as a [`SliceAllocator`].

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use floe_core::{AllocError, SliceAllocator};

/// Allocates slices with `std::alloc::alloc_zeroed` and frees them with
/// `std::alloc::dealloc`.
///
/// A null return is reported as [`AllocError`] instead of aborting, so a
/// buffer that cannot be backed fails construction cleanly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemAllocator;

// SAFETY: `alloc_zeroed` returns zeroed memory valid for `layout`, or
// null, which is mapped to an error.
unsafe impl SliceAllocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let refused = AllocError {
            size: layout.size(),
            align: layout.align(),
        };
        if layout.size() == 0 {
            return Err(refused);
        }
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).ok_or(refused)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: the caller guarantees `ptr` came from `allocate` with `layout`.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
    }
}
