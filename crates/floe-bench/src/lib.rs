//! Benchmark profiles and data generators for floe buffers.
//!
//! - [`small_slices`]: many 64 KiB slices, stresses slice boundaries
//! - [`default_slices`]: the stock 256 MiB limit
//! - [`seeded_u64s`] / [`seeded_indices`]: deterministic inputs via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use floe::BufferConfig;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Element count used by the 1M-element profiles.
pub const ONE_MILLION: u64 = 1_000_000;

/// 64 KiB slices: a 1M-element `u64` buffer spans 123 of them.
pub fn small_slices() -> BufferConfig {
    BufferConfig::new().with_max_slice_size(64 * 1024)
}

/// Stock configuration: everything under 256 MiB fits one slice.
pub fn default_slices() -> BufferConfig {
    BufferConfig::default()
}

/// `len` pseudo-random values, identical for identical seeds.
pub fn seeded_u64s(len: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.next_u64()).collect()
}

/// `n` pseudo-random indices in `0..bound`, identical for identical seeds.
pub fn seeded_indices(n: usize, bound: u64, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.next_u64() % bound).collect()
}
