//! Slice storage for Floe sliced buffers.
//!
//! Owns the memory behind a buffer: one independently allocated block
//! per slice, obtained from a [`SliceAllocator`](floe_core::SliceAllocator)
//! and released exactly once. Pointer work is confined to the private
//! `raw` module and to [`system`], which talks to the global allocator.
//!
//! # Architecture
//!
//! ```text
//! SliceStorage<T, A>
//! ├── SliceLayout (planned once, cached)
//! ├── A: SliceAllocator (SystemAllocator by default)
//! └── RawBlock[] (one per slice, freed on dispose or drop)
//! ```
//!
//! Bulk passes over the blocks are driven by a
//! [`ParallelExecutor`](floe_core::ParallelExecutor): [`RayonExecutor`]
//! for real work, [`SequentialExecutor`] when determinism matters more
//! than throughput.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod parallel;
mod raw;
pub mod storage;
pub mod system;

pub use parallel::{RayonExecutor, SequentialExecutor};
pub use storage::{SliceBase, SliceStorage};
pub use system::SystemAllocator;
