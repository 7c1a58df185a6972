//! Executor wrappers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use floe_core::ParallelExecutor;

#[derive(Debug, Default)]
struct Counters {
    passes: AtomicUsize,
    items: AtomicUsize,
}

/// Counts `for_each_mut` passes and the items they covered, then
/// forwards to `E`.
#[derive(Clone, Debug)]
pub struct CountingExecutor<E> {
    inner: E,
    counters: Arc<Counters>,
}

impl<E> CountingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Number of `for_each_mut` calls.
    pub fn passes(&self) -> usize {
        self.counters.passes.load(Ordering::SeqCst)
    }

    /// Total items across all passes.
    pub fn items(&self) -> usize {
        self.counters.items.load(Ordering::SeqCst)
    }
}

impl<E: ParallelExecutor> ParallelExecutor for CountingExecutor<E> {
    fn for_each_mut<T, F>(&self, items: &mut [T], body: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        self.counters.passes.fetch_add(1, Ordering::SeqCst);
        self.counters.items.fetch_add(items.len(), Ordering::SeqCst);
        self.inner.for_each_mut(items, body);
    }
}
