//! The slice storage manager.
//!
//! A [`SliceStorage`] owns one block per slice of its [`SliceLayout`].
//! Blocks are allocated together at construction and released together
//! on [`dispose`](SliceStorage::dispose) or drop.
//!
//! Lifecycle:
//!
//! ```text
//! allocate() ──► Live ──dispose()/drop──► Disposed (terminal)
//!     │
//!     └─ any slice refused ─► every earlier slice released, Err(AllocationFailure)
//! ```

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;

use floe_core::{
    AllocError, BufferConfig, BufferError, Element, SliceAllocator, SliceIndex, SliceLayout,
    SliceLocator,
};
use tracing::{debug, instrument, trace, warn};

use crate::raw::{BlockTable, RawBlock};
use crate::system::SystemAllocator;

/// Raw handle to the start of one slice, plus its element count.
///
/// Produced by [`SliceStorage::base`] for callers that need to hand
/// slice memory to foreign code. Dereferencing is the caller's
/// responsibility: the pointer is valid for `len` elements until the
/// owning storage is disposed or dropped.
#[derive(Debug, PartialEq, Eq)]
pub struct SliceBase<T> {
    /// Pointer to element 0 of the slice.
    pub ptr: NonNull<T>,
    /// Number of elements in the slice. Never index at or past this.
    pub len: usize,
}

impl<T> Clone for SliceBase<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SliceBase<T> {}

/// Owned slice blocks for `T` elements.
///
/// Not internally synchronised. Data access goes through `&self` /
/// `&mut self`, so the borrow checker rules out disposal racing any
/// other operation on the same instance.
pub struct SliceStorage<T: Element, A: SliceAllocator = SystemAllocator> {
    layout: SliceLayout,
    table: BlockTable<A>,
    disposed: bool,
    _marker: PhantomData<T>,
}

impl<T: Element, A: SliceAllocator> SliceStorage<T, A> {
    /// Plan the layout for `element_count` elements and allocate every slice.
    ///
    /// Each slice is requested separately and is zero-filled. If any
    /// request fails, all slices allocated so far are released before
    /// [`BufferError::AllocationFailure`] is returned.
    #[instrument(level = "debug", skip(config, allocator))]
    pub fn allocate(
        element_count: u64,
        config: &BufferConfig,
        allocator: A,
    ) -> Result<Self, BufferError> {
        let layout = SliceLayout::for_element::<T>(element_count, config)?;
        let mut table = BlockTable::with_capacity(allocator, layout.slice_count());

        for (i, len) in layout.slice_sizes().enumerate() {
            let bytes = len * size_of::<T>();
            let request = Layout::from_size_align(bytes, align_of::<T>()).map_err(|_| AllocError {
                size: bytes,
                align: align_of::<T>(),
            });
            if let Err(source) = request.and_then(|request| table.push_new(request)) {
                warn!(
                    slice = i,
                    bytes,
                    rolled_back = table.len(),
                    "slice allocation failed, releasing earlier slices"
                );
                // Dropping `table` releases the slices allocated so far.
                return Err(BufferError::AllocationFailure {
                    slice: SliceIndex(i),
                    bytes,
                    source,
                });
            }
            trace!(slice = i, bytes, "slice allocated");
        }

        debug!(
            slice_count = layout.slice_count(),
            binary_size = layout.binary_size(),
            "slice storage allocated"
        );
        Ok(Self {
            layout,
            table,
            disposed: false,
            _marker: PhantomData,
        })
    }

    /// The cached layout. Valid after disposal.
    pub fn layout(&self) -> &SliceLayout {
        &self.layout
    }

    /// The allocator backing this storage.
    pub fn allocator(&self) -> &A {
        self.table.allocator()
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every slice back to the allocator.
    ///
    /// The first call frees each block exactly once; later calls are
    /// no-ops. Never fails. Also runs on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let released = self.table.release_all();
        self.disposed = true;
        debug!(released, "slice storage disposed");
    }

    /// Bytes currently held from the allocator. Zero after disposal.
    pub fn memory_bytes(&self) -> usize {
        self.table.iter().map(RawBlock::byte_len).sum()
    }

    /// Elements of the slice identified by `at`.
    pub fn slice<L: SliceLocator>(&self, at: L) -> Result<&[T], BufferError> {
        Ok(self.block(at)?.as_slice())
    }

    /// Mutable elements of the slice identified by `at`.
    pub fn slice_mut<L: SliceLocator>(&mut self, at: L) -> Result<&mut [T], BufferError> {
        let slice = self.live_slice(at)?;
        self.table
            .get_mut(slice.0)
            .map(RawBlock::as_mut_slice::<T>)
            .ok_or(BufferError::UseAfterDispose)
    }

    /// Raw base pointer and length of the slice identified by `at`.
    pub fn base<L: SliceLocator>(&self, at: L) -> Result<SliceBase<T>, BufferError> {
        let slice = self.live_slice(at)?;
        let len = self.layout.slice_size(slice)?;
        let block = self.block(slice)?;
        Ok(SliceBase {
            ptr: block.base(),
            len,
        })
    }

    /// Every slice, in order.
    pub fn slices(&self) -> Result<impl Iterator<Item = &[T]> + '_, BufferError> {
        self.ensure_live()?;
        Ok(self.table.iter().map(RawBlock::as_slice::<T>))
    }

    /// Every slice mutably, in order. Slices never overlap.
    pub fn slices_mut(&mut self) -> Result<impl Iterator<Item = &mut [T]> + '_, BufferError> {
        self.ensure_live()?;
        Ok(self.table.iter_mut().map(RawBlock::as_mut_slice::<T>))
    }

    /// Set every byte of every slice to zero.
    ///
    /// This is a byte-level clear, not a value-level reset: it does not
    /// go through any element constructor.
    pub fn zero(&mut self) -> Result<(), BufferError> {
        self.ensure_live()?;
        for block in self.table.iter_mut() {
            block.as_bytes_mut().fill(0);
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), BufferError> {
        if self.disposed {
            Err(BufferError::UseAfterDispose)
        } else {
            Ok(())
        }
    }

    fn live_slice<L: SliceLocator>(&self, at: L) -> Result<SliceIndex, BufferError> {
        self.ensure_live()?;
        at.locate(&self.layout)
    }

    fn block<L: SliceLocator>(&self, at: L) -> Result<&RawBlock, BufferError> {
        let slice = self.live_slice(at)?;
        self.table
            .get(slice.0)
            .ok_or(BufferError::UseAfterDispose)
    }
}

impl<T: Element, A: SliceAllocator> Drop for SliceStorage<T, A> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use floe_core::{ElementIndex, IndexKind};
    use floe_test_utils::{CountingAllocator, FailingAllocator};

    use super::*;

    fn small_config() -> BufferConfig {
        // 4 u64 per slice.
        BufferConfig::new().with_max_slice_size(32)
    }

    #[test]
    fn allocates_one_block_per_slice() {
        let alloc = CountingAllocator::new(SystemAllocator);
        let storage = SliceStorage::<u64, _>::allocate(10, &small_config(), alloc.clone()).unwrap();
        assert_eq!(storage.layout().slice_count(), 3);
        assert_eq!(alloc.allocations(), 3);
        assert_eq!(alloc.live_bytes(), 80);
        assert_eq!(storage.memory_bytes(), 80);
    }

    #[test]
    fn fresh_slices_are_zeroed() {
        let storage = SliceStorage::<u32, _>::allocate(9, &small_config(), SystemAllocator).unwrap();
        for slice in storage.slices().unwrap() {
            assert!(slice.iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn slice_lengths_follow_layout() {
        let storage = SliceStorage::<u64, _>::allocate(10, &small_config(), SystemAllocator).unwrap();
        let lens: Vec<usize> = storage.slices().unwrap().map(<[u64]>::len).collect();
        assert_eq!(lens, vec![4, 4, 2]);
        assert_eq!(storage.slice(ElementIndex(9)).unwrap().len(), 2);
    }

    #[test]
    fn empty_storage_allocates_nothing() {
        let alloc = CountingAllocator::new(SystemAllocator);
        let mut storage = SliceStorage::<u64, _>::allocate(0, &small_config(), alloc.clone()).unwrap();
        assert_eq!(alloc.allocations(), 0);
        assert!(!storage.is_disposed());
        storage.dispose();
        assert!(storage.is_disposed());
        assert_eq!(alloc.deallocations(), 0);
    }

    #[test]
    fn dispose_twice_frees_once() {
        let alloc = CountingAllocator::new(SystemAllocator);
        let mut storage = SliceStorage::<u64, _>::allocate(10, &small_config(), alloc.clone()).unwrap();
        storage.dispose();
        storage.dispose();
        drop(storage);
        assert_eq!(alloc.allocations(), 3);
        assert_eq!(alloc.deallocations(), 3);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn drop_releases_every_slice() {
        let alloc = CountingAllocator::new(SystemAllocator);
        {
            let _storage =
                SliceStorage::<u16, _>::allocate(100, &small_config(), alloc.clone()).unwrap();
            assert_eq!(alloc.live_blocks(), 7);
        }
        assert_eq!(alloc.live_blocks(), 0);
    }

    #[test]
    fn failed_allocation_rolls_back_earlier_slices() {
        let alloc = CountingAllocator::new(FailingAllocator::fail_on(SystemAllocator, 2));
        let err = SliceStorage::<u64, _>::allocate(10, &small_config(), alloc.clone())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            BufferError::AllocationFailure {
                slice: SliceIndex(2),
                bytes: 16,
                ..
            }
        ));
        assert_eq!(alloc.allocations(), 2);
        assert_eq!(alloc.deallocations(), 2);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn first_slice_failure_allocates_nothing() {
        let alloc = CountingAllocator::new(FailingAllocator::fail_on(SystemAllocator, 0));
        let result = SliceStorage::<u8, _>::allocate(5, &small_config(), alloc.clone());
        assert!(result.is_err());
        assert_eq!(alloc.allocations(), 0);
        assert_eq!(alloc.deallocations(), 0);
    }

    #[test]
    fn invalid_config_fails_before_allocating() {
        let alloc = CountingAllocator::new(SystemAllocator);
        let config = BufferConfig::new().with_max_slice_size(4);
        let result = SliceStorage::<u64, _>::allocate(10, &config, alloc.clone());
        assert!(matches!(
            result,
            Err(BufferError::InvalidConfiguration(_))
        ));
        assert_eq!(alloc.allocations(), 0);
    }

    #[test]
    fn access_after_dispose_is_rejected() {
        let mut storage =
            SliceStorage::<u64, _>::allocate(10, &small_config(), SystemAllocator).unwrap();
        storage.dispose();
        assert_eq!(
            storage.slice(SliceIndex(0)).err(),
            Some(BufferError::UseAfterDispose)
        );
        assert_eq!(storage.zero(), Err(BufferError::UseAfterDispose));
        assert!(storage.slices().is_err());
        assert!(storage.base(SliceIndex(0)).is_err());
        // The layout stays queryable.
        assert_eq!(storage.layout().slice_count(), 3);
        assert_eq!(storage.memory_bytes(), 0);
    }

    #[test]
    fn out_of_range_slice_rejected() {
        let storage = SliceStorage::<u64, _>::allocate(10, &small_config(), SystemAllocator).unwrap();
        assert_eq!(
            storage.slice(SliceIndex(3)).err(),
            Some(BufferError::out_of_range(IndexKind::Slice, 3, 3))
        );
        assert_eq!(
            storage.base(ElementIndex(10)).err(),
            Some(BufferError::out_of_range(IndexKind::Element, 10, 10))
        );
    }

    #[test]
    fn zero_clears_written_bytes() {
        let mut storage =
            SliceStorage::<u64, _>::allocate(10, &small_config(), SystemAllocator).unwrap();
        for slice in storage.slices_mut().unwrap() {
            slice.fill(u64::MAX);
        }
        storage.zero().unwrap();
        assert!(storage.slices().unwrap().flatten().all(|&v| v == 0));
    }

    #[test]
    fn base_points_at_slice_start() {
        let mut storage =
            SliceStorage::<u32, _>::allocate(20, &small_config(), SystemAllocator).unwrap();
        storage.slice_mut(SliceIndex(1)).unwrap()[0] = 7;
        let base = storage.base(ElementIndex(9)).unwrap();
        assert_eq!(base.len, 8);
        assert_eq!(
            base.ptr.as_ptr() as *const u32,
            storage.slice(SliceIndex(1)).unwrap().as_ptr()
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn rollback_is_logged() {
        let alloc = FailingAllocator::fail_on(SystemAllocator, 1);
        let _ = SliceStorage::<u64, _>::allocate(10, &small_config(), alloc);
        assert!(logs_contain("slice allocation failed"));
    }
}
