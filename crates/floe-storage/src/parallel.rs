//! [`ParallelExecutor`] implementations.

use std::sync::Arc;

use floe_core::{BufferConfig, ConfigError, ParallelExecutor};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Smallest run of elements handed to one rayon task.
///
/// Below this, splitting costs more than the writes it parallelises.
const MIN_ITEMS_PER_TASK: usize = 4096;

/// Fork-join executor backed by rayon.
///
/// Uses the process-wide rayon pool unless built with a dedicated
/// pool via [`with_threads`](Self::with_threads).
#[derive(Clone, Debug, Default)]
pub struct RayonExecutor {
    pool: Option<Arc<ThreadPool>>,
}

impl RayonExecutor {
    /// Executor on the process-wide rayon pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Executor on a dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self, ConfigError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("floe-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::ThreadPool {
                reason: e.to_string(),
            })?;
        debug!(threads, "dedicated executor pool built");
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Executor sized by [`BufferConfig::resolved_worker_count`].
    pub fn from_config(config: &BufferConfig) -> Result<Self, ConfigError> {
        match config.resolved_worker_count() {
            Some(threads) => Self::with_threads(threads),
            None => Ok(Self::global()),
        }
    }

    /// Worker threads available to this executor.
    pub fn current_num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl ParallelExecutor for RayonExecutor {
    fn for_each_mut<T, F>(&self, items: &mut [T], body: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| par_for_each(items, &body)),
            None => par_for_each(items, &body),
        }
    }
}

fn par_for_each<T, F>(items: &mut [T], body: &F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    items
        .par_iter_mut()
        .enumerate()
        .with_min_len(MIN_ITEMS_PER_TASK)
        .for_each(|(i, item)| body(i, item));
}

/// Runs every iteration in order on the calling thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequentialExecutor;

impl ParallelExecutor for SequentialExecutor {
    fn for_each_mut<T, F>(&self, items: &mut [T], body: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        for (i, item) in items.iter_mut().enumerate() {
            body(i, item);
        }
    }
}
