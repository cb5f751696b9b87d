//! `WorkerCoordinator` modeling a message-passing backend: each rank runs on
//! its own thread and reports its result over a channel rather than through
//! a shared return value, the closest in-process stand-in for the original
//! distributed-memory backend's send/receive exchange.

use std::thread;

use crossbeam_channel::unbounded;
use shared_files::{worker_panicked, HuffmanError, HuffmanResult, Rank, WorkerCoordinator};

/// A coordinator whose `worker_count` workers each run on a dedicated
/// thread and report their result to the coordinator over a channel.
pub struct DistributedCoordinator {
    worker_count: usize,
}

impl DistributedCoordinator {
    /// Creates a coordinator with `worker_count` ranks. `worker_count` is
    /// clamped to at least 1.
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }
}

impl WorkerCoordinator for DistributedCoordinator {
    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn gather_in_order<T, F>(&self, produce: F) -> HuffmanResult<Vec<T>>
    where
        T: Send,
        F: Fn(Rank) -> T + Sync,
    {
        let (sender, receiver) = unbounded::<(Rank, T)>();

        thread::scope(|scope| {
            let handles: Vec<_> = (0..self.worker_count)
                .map(|rank| {
                    let sender = sender.clone();
                    let produce = &produce;
                    scope.spawn(move || {
                        let result = produce(rank);
                        // the coordinator keeps `receiver` alive until every
                        // handle below has been joined, so this can only
                        // fail if the worker itself is about to panic.
                        let _ = sender.send((rank, result));
                    })
                })
                .collect();
            drop(sender);

            let mut slots: Vec<Option<T>> = (0..self.worker_count).map(|_| None).collect();
            while let Ok((rank, result)) = receiver.recv() {
                slots[rank] = Some(result);
            }

            for handle in handles {
                handle.join().map_err(worker_panicked)?;
            }

            slots
                .into_iter()
                .enumerate()
                .map(|(rank, slot)| {
                    slot.ok_or_else(|| {
                        HuffmanError::WorkerPanicked(format!("rank {rank} never reported a result"))
                    })
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathers_results_in_rank_order_despite_arbitrary_completion_order() {
        let coordinator = DistributedCoordinator::new(10);
        let results = coordinator
            .gather_in_order(|rank| {
                if rank % 2 == 0 {
                    thread::yield_now();
                }
                rank * 3
            })
            .unwrap();
        assert_eq!(results, (0..10).map(|r| r * 3).collect::<Vec<_>>());
    }

    #[test]
    fn single_worker_reports_its_result() {
        let coordinator = DistributedCoordinator::new(1);
        let results = coordinator.gather_in_order(|rank| rank + 1).unwrap();
        assert_eq!(results, vec![1]);
    }

    #[test]
    fn a_worker_panic_is_reported_as_an_error_instead_of_unwinding() {
        let coordinator = DistributedCoordinator::new(4);
        let err = coordinator
            .gather_in_order(|rank| {
                if rank == 1 {
                    panic!("synthetic worker failure");
                }
                rank
            })
            .unwrap_err();
        assert!(matches!(err, shared_files::HuffmanError::WorkerPanicked(_)));
    }
}
