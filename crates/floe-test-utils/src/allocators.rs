//! Allocator wrappers.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use floe_core::{AllocError, SliceAllocator};

#[derive(Debug, Default)]
struct Counters {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    allocated_bytes: AtomicUsize,
    freed_bytes: AtomicUsize,
}

/// Counts successful allocations and deallocations passing through to `A`.
///
/// Clones share counters, so a test can keep one clone and hand the
/// other to the code under test.
#[derive(Clone, Debug)]
pub struct CountingAllocator<A> {
    inner: A,
    counters: Arc<Counters>,
}

impl<A> CountingAllocator<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Successful `allocate` calls.
    pub fn allocations(&self) -> usize {
        self.counters.allocations.load(Ordering::SeqCst)
    }

    /// `deallocate` calls.
    pub fn deallocations(&self) -> usize {
        self.counters.deallocations.load(Ordering::SeqCst)
    }

    /// Blocks allocated and not yet returned.
    pub fn live_blocks(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    /// Bytes allocated and not yet returned.
    pub fn live_bytes(&self) -> usize {
        self.counters.allocated_bytes.load(Ordering::SeqCst)
            - self.counters.freed_bytes.load(Ordering::SeqCst)
    }
}

// SAFETY: every call is forwarded unchanged to `A`, which upholds the contract.
unsafe impl<A: SliceAllocator> SliceAllocator for CountingAllocator<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.inner.allocate(layout)?;
        self.counters.allocations.fetch_add(1, Ordering::SeqCst);
        self.counters
            .allocated_bytes
            .fetch_add(layout.size(), Ordering::SeqCst);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.counters.deallocations.fetch_add(1, Ordering::SeqCst);
        self.counters
            .freed_bytes
            .fetch_add(layout.size(), Ordering::SeqCst);
        // SAFETY: forwarded from our caller, who upholds the same contract.
        unsafe { self.inner.deallocate(ptr, layout) };
    }
}

/// Refuses the `n`-th allocation request (0-based) and forwards the rest.
///
/// Requests after the refused one are forwarded again, so a constructor
/// that wrongly kept going would be caught by counting. Clones share
/// the request counter.
#[derive(Clone, Debug)]
pub struct FailingAllocator<A> {
    inner: A,
    fail_at: usize,
    requests: Arc<AtomicUsize>,
}

impl<A> FailingAllocator<A> {
    pub fn fail_on(inner: A, fail_at: usize) -> Self {
        Self {
            inner,
            fail_at,
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Allocation requests seen so far, including the refused one.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

// SAFETY: successful requests are forwarded unchanged to `A`.
unsafe impl<A: SliceAllocator> SliceAllocator for FailingAllocator<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if self.requests.fetch_add(1, Ordering::SeqCst) == self.fail_at {
            return Err(AllocError {
                size: layout.size(),
                align: layout.align(),
            });
        }
        self.inner.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from our caller, who upholds the same contract.
        unsafe { self.inner.deallocate(ptr, layout) };
    }
}
