//! Floe: fixed-element-type arrays that outgrow a single allocation.
//!
//! A [`SlicedBuffer`] presents one index space `[0, element_count)` but
//! stores it as a sequence of independently allocated slices, each at
//! most [`BufferConfig::max_slice_size`] bytes (256 MiB by default).
//! Every slice except the last is full, so a global index resolves to
//! `(index / per_slice, index % per_slice)`.
//!
//! # Quick start
//!
//! ```rust
//! use floe::prelude::*;
//!
//! // 64-byte slices hold 8 u64 each: 20 elements span 3 slices.
//! let config = BufferConfig::new().with_max_slice_size(64);
//! let mut buf = SlicedBuffer::<u64>::with_config(20, &config).unwrap();
//! assert_eq!(buf.slice_count(), 3);
//!
//! buf.fill(7).unwrap();
//! buf.set(19, 42).unwrap();
//! assert_eq!(buf.get(0).unwrap(), 7);
//! assert_eq!(buf.get(19).unwrap(), 42);
//! assert!(buf.get(20).is_err());
//!
//! buf.dispose();
//! buf.dispose(); // no-op
//! assert!(buf.is_disposed());
//! ```
//!
//! # Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `floe-core` | Layout planner, config, errors, collaborator traits |
//! | `floe-storage` | Slice storage, system allocator, executors |
//! | `floe` | [`SlicedBuffer`] and the [`prelude`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod buffer;

pub use buffer::{ByteBuffer, SlicedBuffer};

pub use floe_core::{
    AllocError, BufferConfig, BufferError, ConfigError, Element, ElementIndex, IndexKind,
    ParallelExecutor, SliceAllocator, SliceCoord, SliceIndex, SliceLayout, SliceLocator,
};
pub use floe_storage::{RayonExecutor, SequentialExecutor, SliceBase, SliceStorage, SystemAllocator};

/// Common imports for typical Floe usage.
///
/// ```rust
/// use floe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{ByteBuffer, SlicedBuffer};
    pub use floe_core::{
        BufferConfig, BufferError, ElementIndex, SliceCoord, SliceIndex, SliceLocator,
    };
}
