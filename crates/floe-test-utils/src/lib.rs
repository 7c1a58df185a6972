//! Test utilities and instrumented collaborators for Floe development.
//!
//! Provides wrappers around the two collaborator traits
//! ([`SliceAllocator`](floe_core::SliceAllocator),
//! [`ParallelExecutor`](floe_core::ParallelExecutor)) that record what the
//! storage layer asked of them, plus an allocator that refuses a chosen
//! request so rollback paths can be exercised.
//!
//! All wrappers delegate to an inner implementation, so this crate does
//! not depend on `floe-storage`; tests pass in the real allocator or
//! executor they want to observe.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod allocators;
pub mod executors;

pub use allocators::{CountingAllocator, FailingAllocator};
pub use executors::CountingExecutor;
