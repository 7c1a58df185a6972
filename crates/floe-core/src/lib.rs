//! Core types and traits for Floe sliced buffers.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the pure layout arithmetic shared by every other Floe crate:
//!
//! - [`SliceLayout`]: how many slices a buffer needs, how big each one
//!   is, and where each global element index lands.
//! - [`BufferConfig`]: the maximum slice size and executor sizing.
//! - [`Element`]: the marker trait for types a buffer may store.
//! - [`SliceAllocator`] and [`ParallelExecutor`]: the two external
//!   collaborators the storage layer is written against.
//! - [`BufferError`] and [`ConfigError`]: every failure a buffer reports.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod element;
pub mod error;
pub mod id;
pub mod layout;
pub mod traits;

pub use config::BufferConfig;
pub use element::Element;
pub use error::{AllocError, BufferError, ConfigError, IndexKind};
pub use id::{ElementIndex, SliceCoord, SliceIndex};
pub use layout::{SliceLayout, SliceLocator};
pub use traits::{ParallelExecutor, SliceAllocator};
