//! The sliced buffer: indexed access and bulk operations over slice storage.
//!
//! [`SlicedBuffer`] pairs a [`SliceStorage`] with a [`ParallelExecutor`].
//! Single-element access resolves a global index through the cached
//! [`SliceLayout`]; bulk operations walk the slices in order and hand
//! each one to the executor as an independent data-parallel pass.

use std::fmt;
use std::mem::size_of;

use floe_core::{
    BufferConfig, BufferError, Element, ElementIndex, IndexKind, ParallelExecutor,
    SliceAllocator, SliceCoord, SliceIndex, SliceLayout, SliceLocator,
};
use floe_storage::{RayonExecutor, SequentialExecutor, SliceBase, SliceStorage, SystemAllocator};
use tracing::trace;

/// A buffer of `u8` backed by the system allocator.
pub type ByteBuffer = SlicedBuffer<u8>;

/// A logical array of `element_count` values of `T`, stored as
/// independently allocated slices of at most `max_slice_size` bytes.
///
/// States: **live** after construction, **disposed** after
/// [`dispose`](Self::dispose) or drop. Disposal is one-way and
/// idempotent. Once disposed, every data operation returns
/// [`BufferError::UseAfterDispose`]; layout queries keep working.
///
/// The buffer is not internally synchronised. Shared access (`&self`)
/// only reads; every write takes `&mut self`.
pub struct SlicedBuffer<
    T: Element,
    A: SliceAllocator = SystemAllocator,
    E: ParallelExecutor = RayonExecutor,
> {
    storage: SliceStorage<T, A>,
    executor: E,
}

impl<T: Element> SlicedBuffer<T> {
    /// Allocate `element_count` zero-filled elements with the default
    /// configuration.
    pub fn new(element_count: u64) -> Result<Self, BufferError> {
        Self::with_config(element_count, &BufferConfig::default())
    }

    /// Allocate `element_count` zero-filled elements with `config`.
    ///
    /// Uses the system allocator and a rayon executor sized by
    /// `config.worker_count`.
    pub fn with_config(element_count: u64, config: &BufferConfig) -> Result<Self, BufferError> {
        let executor = RayonExecutor::from_config(config)?;
        Self::from_parts(element_count, config, SystemAllocator, executor)
    }

    /// A buffer with no elements and no slices.
    pub fn empty() -> Result<Self, BufferError> {
        Self::new(0)
    }

    /// Allocate a buffer of `source.len()` elements and copy `source` in.
    pub fn from_slice(source: &[T]) -> Result<Self, BufferError> {
        Self::from_slice_with(
            source,
            &BufferConfig::default(),
            SystemAllocator,
            RayonExecutor::global(),
        )
    }

    /// Build a buffer from an owned sequence.
    pub fn from_vec(source: Vec<T>) -> Result<Self, BufferError> {
        Self::from_slice(&source)
    }

    /// Build a buffer from any ordered sequence of values.
    pub fn try_from_iter<I>(source: I) -> Result<Self, BufferError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_vec(source.into_iter().collect())
    }

    /// Build a buffer by copying `count` elements starting at `ptr`.
    ///
    /// # Safety
    ///
    /// When `count > 0`, `ptr` must be non-null, aligned, and valid for
    /// reads of `count` consecutive `T` values for the duration of the call.
    #[allow(unsafe_code)]
    pub unsafe fn from_raw_parts(ptr: *const T, count: usize) -> Result<Self, BufferError> {
        if count == 0 {
            return Self::empty();
        }
        // SAFETY: upheld by the caller.
        let source = unsafe { std::slice::from_raw_parts(ptr, count) };
        Self::from_slice(source)
    }
}

impl<T, A, E> SlicedBuffer<T, A, E>
where
    T: Element,
    A: SliceAllocator,
    E: ParallelExecutor,
{
    /// Allocate `element_count` zero-filled elements with explicit collaborators.
    pub fn from_parts(
        element_count: u64,
        config: &BufferConfig,
        allocator: A,
        executor: E,
    ) -> Result<Self, BufferError> {
        let storage = SliceStorage::allocate(element_count, config, allocator)?;
        Ok(Self { storage, executor })
    }

    /// Allocate a buffer of `source.len()` elements with explicit
    /// collaborators and copy `source` in.
    pub fn from_slice_with(
        source: &[T],
        config: &BufferConfig,
        allocator: A,
        executor: E,
    ) -> Result<Self, BufferError> {
        let mut buffer = Self::from_parts(source.len() as u64, config, allocator, executor)?;
        buffer.copy_from(0, source)?;
        Ok(buffer)
    }

    // ── Layout ─────────────────────────────────────────────────────

    /// The cached slice layout.
    pub fn layout(&self) -> &SliceLayout {
        self.storage.layout()
    }

    /// Number of logical elements.
    pub fn element_count(&self) -> u64 {
        self.layout().element_count()
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        size_of::<T>()
    }

    /// Name of the element type, for diagnostics.
    pub fn element_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    /// `element_count * element_size`.
    pub fn binary_size(&self) -> u64 {
        self.layout().binary_size()
    }

    /// Number of slices.
    pub fn slice_count(&self) -> usize {
        self.layout().slice_count()
    }

    /// Elements in every slice but the last.
    pub fn elements_per_full_slice(&self) -> u64 {
        self.layout().elements_per_full_slice()
    }

    /// Elements in the slice identified by `at`.
    pub fn slice_size<L: SliceLocator>(&self, at: L) -> Result<usize, BufferError> {
        self.layout().slice_size(at)
    }

    /// Bytes in the slice identified by `at`.
    pub fn binary_slice_size<L: SliceLocator>(&self, at: L) -> Result<usize, BufferError> {
        self.layout().binary_slice_size(at)
    }

    /// The slice that owns element `index`.
    pub fn slice_index(&self, index: u64) -> Result<SliceIndex, BufferError> {
        self.layout().slice_of(ElementIndex(index))
    }

    /// Resolve element `index` to `(slice, local offset)`.
    pub fn to_slice_coordinates(&self, index: u64) -> Result<SliceCoord, BufferError> {
        self.layout().to_slice_coordinates(ElementIndex(index))
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Release every slice. Idempotent; also runs on drop.
    pub fn dispose(&mut self) {
        self.storage.dispose();
    }

    /// Whether the buffer has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.storage.is_disposed()
    }

    /// The allocator backing this buffer.
    pub fn allocator(&self) -> &A {
        self.storage.allocator()
    }

    /// The executor driving bulk operations.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    // ── Indexed access ─────────────────────────────────────────────

    /// Read element `index`.
    pub fn get(&self, index: u64) -> Result<T, BufferError> {
        self.get_ref(index).copied()
    }

    /// Borrow element `index`.
    pub fn get_ref(&self, index: u64) -> Result<&T, BufferError> {
        let coord = self.resolve(index)?;
        self.storage
            .slice(coord.slice)?
            .get(coord.offset)
            .ok_or_else(|| self.element_out_of_range(index))
    }

    /// Mutably borrow element `index`.
    pub fn get_mut(&mut self, index: u64) -> Result<&mut T, BufferError> {
        let coord = self.resolve(index)?;
        let bound = self.element_count();
        self.storage
            .slice_mut(coord.slice)?
            .get_mut(coord.offset)
            .ok_or_else(|| BufferError::out_of_range(IndexKind::Element, index, bound))
    }

    /// Write `value` at element `index`.
    pub fn set(&mut self, index: u64, value: T) -> Result<(), BufferError> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Elements of the slice identified by `at`.
    pub fn slice<L: SliceLocator>(&self, at: L) -> Result<&[T], BufferError> {
        self.storage.slice(at)
    }

    /// Mutable elements of the slice identified by `at`.
    pub fn slice_mut<L: SliceLocator>(&mut self, at: L) -> Result<&mut [T], BufferError> {
        self.storage.slice_mut(at)
    }

    /// Raw base pointer and element count of the slice identified by `at`.
    ///
    /// For handing slice memory to code that cannot take a Rust slice.
    /// The pointer is valid for `len` elements until the buffer is
    /// disposed; never offset it past `len`.
    pub fn unsafe_slice_base<L: SliceLocator>(&self, at: L) -> Result<SliceBase<T>, BufferError> {
        self.storage.base(at)
    }

    /// Every slice, in order.
    pub fn slices(&self) -> Result<impl Iterator<Item = &[T]> + '_, BufferError> {
        self.storage.slices()
    }

    /// Every element, in global index order, across slice boundaries.
    pub fn iter(&self) -> Result<impl Iterator<Item = &T> + '_, BufferError> {
        Ok(self.storage.slices()?.flatten())
    }

    // ── Bulk operations ────────────────────────────────────────────

    /// Write `value` to every element.
    ///
    /// Slices are visited in order; within a slice the writes run as one
    /// unordered data-parallel pass on the executor. Returns after every
    /// write has completed.
    pub fn fill(&mut self, value: T) -> Result<(), BufferError> {
        trace!(slices = self.slice_count(), "fill");
        let executor = &self.executor;
        for slice in self.storage.slices_mut()? {
            executor.for_each_mut(slice, |_, slot| *slot = value);
        }
        Ok(())
    }

    /// Set every underlying byte to zero.
    ///
    /// This is a byte-level clear, not `fill(T::default())`: it writes
    /// zero bytes straight into slice memory without producing values
    /// of `T`. The two agree for primitive types; for a composite
    /// element whose default is not all-zero bytes they do not.
    pub fn zero(&mut self) -> Result<(), BufferError> {
        trace!(slices = self.slice_count(), "zero");
        self.storage.zero()
    }

    /// Copy `source` into elements `[offset, offset + source.len())`.
    ///
    /// The destination range may span several slices. Each slice's
    /// share is copied as one data-parallel pass. The whole range is
    /// bounds-checked before anything is written.
    pub fn copy_from(&mut self, offset: u64, source: &[T]) -> Result<(), BufferError> {
        self.ensure_live()?;
        if source.is_empty() {
            return if offset <= self.element_count() {
                Ok(())
            } else {
                Err(self.element_out_of_range(offset))
            };
        }
        let last = offset
            .checked_add(source.len() as u64 - 1)
            .ok_or_else(|| self.element_out_of_range(u64::MAX))?;
        self.layout().check_element(ElementIndex(last))?;
        let start = self.resolve(offset)?;
        trace!(offset, len = source.len(), first_slice = %start.slice, "copy_from");

        let executor = &self.executor;
        let mut remaining = source;
        let mut slice = start.slice;
        let mut local = start.offset;
        while !remaining.is_empty() {
            let dst = self.storage.slice_mut(slice)?;
            let take = (dst.len() - local).min(remaining.len());
            let (chunk, rest) = remaining.split_at(take);
            executor.for_each_mut(&mut dst[local..local + take], |i, slot| *slot = chunk[i]);
            remaining = rest;
            slice = SliceIndex(slice.0 + 1);
            local = 0;
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), BufferError> {
        if self.is_disposed() {
            Err(BufferError::UseAfterDispose)
        } else {
            Ok(())
        }
    }

    /// Liveness first, then bounds.
    fn resolve(&self, index: u64) -> Result<SliceCoord, BufferError> {
        self.ensure_live()?;
        self.to_slice_coordinates(index)
    }

    fn element_out_of_range(&self, index: u64) -> BufferError {
        BufferError::out_of_range(IndexKind::Element, index, self.element_count())
    }
}

impl<T: Element, A: SliceAllocator> SlicedBuffer<T, A, SequentialExecutor> {
    /// Allocate with `allocator` and run bulk operations on the calling thread.
    pub fn sequential(
        element_count: u64,
        config: &BufferConfig,
        allocator: A,
    ) -> Result<Self, BufferError> {
        Self::from_parts(element_count, config, allocator, SequentialExecutor)
    }
}

impl<T: Element> TryFrom<&[T]> for SlicedBuffer<T> {
    type Error = BufferError;

    fn try_from(source: &[T]) -> Result<Self, Self::Error> {
        Self::from_slice(source)
    }
}

impl<T: Element> TryFrom<Vec<T>> for SlicedBuffer<T> {
    type Error = BufferError;

    fn try_from(source: Vec<T>) -> Result<Self, Self::Error> {
        Self::from_vec(source)
    }
}

impl<T, A, E> fmt::Debug for SlicedBuffer<T, A, E>
where
    T: Element,
    A: SliceAllocator,
    E: ParallelExecutor,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlicedBuffer")
            .field("element_type", &self.element_type_name())
            .field("element_count", &self.element_count())
            .field("slice_count", &self.slice_count())
            .field("binary_size", &self.binary_size())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
