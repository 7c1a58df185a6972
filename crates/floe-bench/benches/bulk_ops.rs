//! Criterion micro-benchmarks for fill, zero, and copy_from.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use floe::{BufferConfig, SequentialExecutor, SlicedBuffer, SystemAllocator};
use floe_bench::{default_slices, seeded_u64s, small_slices, ONE_MILLION};

fn parallel_buffer(config: &BufferConfig) -> SlicedBuffer<u64> {
    SlicedBuffer::with_config(ONE_MILLION, config).unwrap()
}

fn sequential_buffer(
    config: &BufferConfig,
) -> SlicedBuffer<u64, SystemAllocator, SequentialExecutor> {
    SlicedBuffer::sequential(ONE_MILLION, config, SystemAllocator).unwrap()
}

/// Benchmark: fill 1M u64 across 123 small slices, rayon vs calling thread.
fn bench_fill_1m(c: &mut Criterion) {
    let config = small_slices();
    let mut group = c.benchmark_group("fill_1m");

    let mut parallel = parallel_buffer(&config);
    group.bench_function("rayon", |b| {
        b.iter(|| parallel.fill(black_box(0xdead_beef)).unwrap());
    });

    let mut sequential = sequential_buffer(&config);
    group.bench_function("sequential", |b| {
        b.iter(|| sequential.fill(black_box(0xdead_beef)).unwrap());
    });

    group.finish();
}

/// Benchmark: byte-level zero vs fill(0) on 1M u64.
fn bench_zero_1m(c: &mut Criterion) {
    let mut buf = parallel_buffer(&small_slices());
    let mut group = c.benchmark_group("zero_1m");
    group.bench_function("zero", |b| b.iter(|| buf.zero().unwrap()));
    group.bench_function("fill_default", |b| b.iter(|| buf.fill(0).unwrap()));
    group.finish();
}

/// Benchmark: copy 1M seeded u64 in, small slices vs one big slice.
fn bench_copy_from_1m(c: &mut Criterion) {
    let source = seeded_u64s(ONE_MILLION as usize, 42);
    let mut group = c.benchmark_group("copy_from_1m");

    let mut small = parallel_buffer(&small_slices());
    group.bench_function("small_slices", |b| {
        b.iter(|| small.copy_from(0, black_box(&source)).unwrap());
    });

    let mut whole = parallel_buffer(&default_slices());
    group.bench_function("single_slice", |b| {
        b.iter(|| whole.copy_from(0, black_box(&source)).unwrap());
    });

    group.finish();
}

/// Benchmark: allocate and dispose a 1M-element buffer.
fn bench_allocate_1m(c: &mut Criterion) {
    let config = small_slices();
    c.bench_function("allocate_1m", |b| {
        b.iter(|| {
            let buf = parallel_buffer(&config);
            black_box(buf.slice_count());
        });
    });
}

criterion_group!(
    benches,
    bench_fill_1m,
    bench_zero_1m,
    bench_copy_from_1m,
    bench_allocate_1m
);
criterion_main!(benches);
