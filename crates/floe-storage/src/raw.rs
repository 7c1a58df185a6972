//! Low-level owned blocks and the table that pairs them with their allocator.
//!
//! Every `unsafe` operation on slice memory lives here. A [`RawBlock`] is
//! only ever created by [`BlockTable::push_new`] and only ever freed by
//! [`BlockTable::release_all`], so each block is returned to the same
//! allocator that produced it, exactly once.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;
use std::slice;

use floe_core::{AllocError, Element, SliceAllocator};
use tracing::trace;

/// One allocated slice: a base pointer plus the layout it was requested with.
pub(crate) struct RawBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: a RawBlock is the sole owner of its allocation; moving it to
// another thread moves that ownership.
unsafe impl Send for RawBlock {}
// SAFETY: `&RawBlock` only hands out shared views of the memory.
unsafe impl Sync for RawBlock {}

impl RawBlock {
    /// Size of the block in bytes.
    pub(crate) fn byte_len(&self) -> usize {
        self.layout.size()
    }

    /// Base pointer, typed as `T`.
    pub(crate) fn base<T: Element>(&self) -> NonNull<T> {
        self.ptr.cast()
    }

    /// View the block as elements of `T`.
    pub(crate) fn as_slice<T: Element>(&self) -> &[T] {
        self.debug_check::<T>();
        // SAFETY: the allocator contract gives us `layout.size()` readable,
        // zero-initialised bytes aligned to `layout.align() >= align_of::<T>()`.
        // Afterwards the bytes are only written as whole `T` values or as
        // zeros, both valid for an `Element` (no padding, zero is valid).
        unsafe {
            slice::from_raw_parts(
                self.ptr.as_ptr().cast::<T>(),
                self.layout.size() / size_of::<T>(),
            )
        }
    }

    /// Mutable view of the block as elements of `T`.
    pub(crate) fn as_mut_slice<T: Element>(&mut self) -> &mut [T] {
        self.debug_check::<T>();
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusivity.
        unsafe {
            slice::from_raw_parts_mut(
                self.ptr.as_ptr().cast::<T>(),
                self.layout.size() / size_of::<T>(),
            )
        }
    }

    /// Mutable view of the raw bytes.
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: every byte is initialised (zeroed at allocation, then
        // only overwritten by padding-free `Element` values) and
        // `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }

    fn debug_check<T: Element>(&self) {
        debug_assert_eq!(self.layout.size() % size_of::<T>(), 0);
        debug_assert!(self.layout.align() >= align_of::<T>());
    }
}

/// The owned blocks of one storage instance together with their allocator.
///
/// Dropping the table releases whatever is still held, which is what
/// makes a failed construction roll back: the partially filled table is
/// simply dropped.
pub(crate) struct BlockTable<A: SliceAllocator> {
    allocator: A,
    blocks: Vec<RawBlock>,
}

impl<A: SliceAllocator> BlockTable<A> {
    pub(crate) fn with_capacity(allocator: A, capacity: usize) -> Self {
        Self {
            allocator,
            blocks: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Allocate one block and append it.
    pub(crate) fn push_new(&mut self, layout: Layout) -> Result<(), AllocError> {
        if layout.size() == 0 {
            return Err(AllocError {
                size: 0,
                align: layout.align(),
            });
        }
        let ptr = self.allocator.allocate(layout)?;
        self.blocks.push(RawBlock { ptr, layout });
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&RawBlock> {
        self.blocks.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut RawBlock> {
        self.blocks.get_mut(index)
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, RawBlock> {
        self.blocks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, RawBlock> {
        self.blocks.iter_mut()
    }

    /// Return every block to the allocator. Returns how many were released.
    ///
    /// Idempotent: the table is empty afterwards.
    pub(crate) fn release_all(&mut self) -> usize {
        let released = self.blocks.len();
        for (i, block) in self.blocks.drain(..).enumerate() {
            trace!(slice = i, bytes = block.layout.size(), "slice released");
            // SAFETY: `block` was produced by `self.allocator.allocate` with
            // `block.layout` in `push_new`, and draining removes it from the
            // table so it cannot be released twice.
            unsafe { self.allocator.deallocate(block.ptr, block.layout) };
        }
        released
    }
}

impl<A: SliceAllocator> Drop for BlockTable<A> {
    fn drop(&mut self) {
        self.release_all();
    }
}
