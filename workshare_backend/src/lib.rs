//! `WorkerCoordinator` backed by a shared-memory work-sharing pool: ranks are
//! just rayon tasks drawn from a common pool, the closest in-process
//! equivalent to the original shared-memory thread-team backend.

use rayon::prelude::*;
use shared_files::{HuffmanResult, Rank, WorkerCoordinator};

/// A coordinator whose `worker_count` workers run as rayon tasks over the
/// global thread pool.
pub struct WorkshareCoordinator {
    worker_count: usize,
}

impl WorkshareCoordinator {
    /// Creates a coordinator with `worker_count` ranks. `worker_count` is
    /// clamped to at least 1.
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }
}

impl WorkerCoordinator for WorkshareCoordinator {
    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn gather_in_order<T, F>(&self, produce: F) -> HuffmanResult<Vec<T>>
    where
        T: Send,
        F: Fn(Rank) -> T + Sync,
    {
        // rayon resumes any worker panic on the thread that called us, so
        // there is no separate coordination boundary to catch one at here.
        Ok((0..self.worker_count)
            .into_par_iter()
            .map(|rank| produce(rank))
            .collect())
    }
}
