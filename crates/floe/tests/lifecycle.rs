//! Allocation, rollback, and disposal as seen by the allocator.

use floe::prelude::*;
use floe::{SequentialExecutor, SystemAllocator};
use floe_test_utils::{CountingAllocator, FailingAllocator};
use proptest::prelude::*;

fn config() -> BufferConfig {
    // 16 u64 per slice.
    BufferConfig::new().with_max_slice_size(128)
}

#[test]
fn slice_memory_matches_layout() {
    let alloc = CountingAllocator::new(SystemAllocator);
    let buf =
        SlicedBuffer::<u64, _, SequentialExecutor>::sequential(100, &config(), alloc.clone())
            .unwrap();
    assert_eq!(buf.slice_count(), 7);
    assert_eq!(alloc.allocations(), 7);
    assert_eq!(alloc.live_bytes() as u64, buf.binary_size());
    let sizes: Vec<usize> = (0..7)
        .map(|i| buf.binary_slice_size(SliceIndex(i)).unwrap())
        .collect();
    assert_eq!(sizes, vec![128, 128, 128, 128, 128, 128, 32]);
}

#[test]
fn scope_end_disposes() {
    let alloc = CountingAllocator::new(SystemAllocator);
    {
        let mut buf =
            SlicedBuffer::<u64, _, SequentialExecutor>::sequential(100, &config(), alloc.clone())
                .unwrap();
        buf.fill(1).unwrap();
    }
    assert_eq!(alloc.deallocations(), 7);
    assert_eq!(alloc.live_bytes(), 0);
}

#[test]
fn explicit_dispose_then_scope_end_frees_once() {
    let alloc = CountingAllocator::new(SystemAllocator);
    {
        let mut buf =
            SlicedBuffer::<u64, _, SequentialExecutor>::sequential(100, &config(), alloc.clone())
                .unwrap();
        buf.dispose();
        assert_eq!(alloc.deallocations(), 7);
    }
    assert_eq!(alloc.deallocations(), 7);
}

#[test]
fn buffer_moves_across_threads() {
    let mut buf = SlicedBuffer::<u64>::with_config(100, &config()).unwrap();
    buf.fill(9).unwrap();
    let handle = std::thread::spawn(move || buf.iter().unwrap().sum::<u64>());
    assert_eq!(handle.join().unwrap(), 900);
}

proptest! {
    #[test]
    fn any_failed_slice_rolls_back_everything(
        count in 1u64..400,
        fail_pick in any::<usize>(),
    ) {
        let slices = count.div_ceil(16) as usize;
        let fail_at = fail_pick % slices;
        let alloc = CountingAllocator::new(FailingAllocator::fail_on(SystemAllocator, fail_at));

        let result = SlicedBuffer::<u64, _, SequentialExecutor>::sequential(
            count,
            &config(),
            alloc.clone(),
        );

        match result {
            Err(BufferError::AllocationFailure { slice, .. }) => {
                prop_assert_eq!(slice, SliceIndex(fail_at));
            }
            other => prop_assert!(false, "expected AllocationFailure, got {:?}", other),
        }
        prop_assert_eq!(alloc.allocations(), fail_at);
        prop_assert_eq!(alloc.deallocations(), fail_at);
        prop_assert_eq!(alloc.live_bytes(), 0);
    }
}
