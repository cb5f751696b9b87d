//! `WorkerCoordinator` backed by a fixed pool of dedicated OS threads, one
//! per rank, joined back in rank order: the explicit thread-pool backend,
//! as opposed to [`workshare_backend`]'s shared task pool.

use std::thread;

use shared_files::{worker_panicked, HuffmanResult, Rank, WorkerCoordinator};

/// A coordinator that spawns exactly `worker_count` dedicated OS threads
/// per call and joins them in rank order.
pub struct ThreadpoolCoordinator {
    worker_count: usize,
}

impl ThreadpoolCoordinator {
    /// Creates a coordinator with `worker_count` ranks. `worker_count` is
    /// clamped to at least 1.
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }
}

impl WorkerCoordinator for ThreadpoolCoordinator {
    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn gather_in_order<T, F>(&self, produce: F) -> HuffmanResult<Vec<T>>
    where
        T: Send,
        F: Fn(Rank) -> T + Sync,
    {
        thread::scope(|scope| {
            let handles: Vec<_> = (0..self.worker_count)
                .map(|rank| {
                    let produce = &produce;
                    scope.spawn(move || produce(rank))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().map_err(worker_panicked))
                .collect()
        })
    }
}
