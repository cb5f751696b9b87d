//! The `WorkerCoordinator` capability abstracts over how a parallel backend
//! fans work out to `N` workers and gathers their results back in rank
//! order. The Huffman encode driver in `huffman_core` is written once
//! against this trait; `workshare_backend`, `threadpool_backend`, and
//! `distributed_backend` each supply one implementation.

use std::sync::Arc;

use crate::error::HuffmanResult;

/// A single worker's rank, `0..worker_count()`. Rank 0 is the coordinator.
pub type Rank = usize;

/// `N` workers addressed by rank, with rank 0 acting as coordinator.
///
/// Implementors decide *how* work is scheduled (a shared thread pool, a
/// fixed pool of dedicated threads, message-passing over channels) but must
/// preserve the one contract callers rely on: `gather_in_order` returns
/// results ordered by ascending rank, regardless of which worker finishes
/// first.
pub trait WorkerCoordinator {
    /// Number of workers, `N >= 1`.
    fn worker_count(&self) -> usize;

    /// Makes `payload` available to every worker. In all backends here this
    /// is a cheap `Arc` clone, not a physical copy — the "broadcast" is of
    /// a reference, matching the in-process equivalence the specification
    /// allows for shared-memory backends.
    fn broadcast(&self, payload: Arc<[u8]>) -> Vec<Arc<[u8]>> {
        vec![payload; self.worker_count()]
    }

    /// Runs `produce(rank)` once per rank, however the backend schedules
    /// that work, and returns the results ordered by ascending rank.
    ///
    /// If a worker panics, implementations that run workers on their own
    /// threads (as opposed to the caller's own stack) must catch that panic
    /// at this boundary and report it as [`HuffmanError::WorkerPanicked`]
    /// rather than letting it unwind past the coordinator.
    ///
    /// [`HuffmanError::WorkerPanicked`]: crate::error::HuffmanError::WorkerPanicked
    fn gather_in_order<T, F>(&self, produce: F) -> HuffmanResult<Vec<T>>
    where
        T: Send,
        F: Fn(Rank) -> T + Sync;
}
