//! Contracts for the two external collaborators of a sliced buffer.
//!
//! Storage never talks to the system allocator or a thread pool
//! directly. It goes through [`SliceAllocator`] and [`ParallelExecutor`]
//! so tests can substitute instrumented or failing implementations.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::AllocError;

/// Source of raw slice memory.
///
/// The storage layer requests exactly one block per slice at
/// construction and returns each block exactly once on disposal. It
/// never requests more than the configured maximum slice size, and
/// never requests a zero-sized block.
///
/// # Safety
///
/// A successful [`allocate`](Self::allocate) must return a pointer that
/// - is valid for reads and writes of `layout.size()` bytes,
/// - is aligned to `layout.align()`,
/// - points to memory whose every byte is initialised to zero,
/// - stays valid until passed to [`deallocate`](Self::deallocate).
pub unsafe trait SliceAllocator: Send + Sync {
    /// Request a zero-filled block described by `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`allocate`](Self::allocate) on this same
    /// allocator with the same `layout`, and must not have been
    /// deallocated already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Fork-join data-parallel loop.
///
/// Implementations run `body(i, &mut items[i])` once for every index,
/// in any order and on any thread, and return only after every call has
/// completed. The mutable borrow of `items` is what makes iterations
/// independent: no two calls can observe the same element.
pub trait ParallelExecutor: Send + Sync {
    /// Apply `body` to every element of `items`, joining before returning.
    fn for_each_mut<T, F>(&self, items: &mut [T], body: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync;
}
