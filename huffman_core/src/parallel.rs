//! The shared parallel encode driver. Written once against
//! [`WorkerCoordinator`], reused unmodified by every backend crate: only the
//! *scheduling* of `produce(rank)` differs between a work-sharing pool, a
//! fixed thread pool, and a message-passing-style set of workers.

use std::sync::Arc;

use shared_files::{HuffmanError, WorkerCoordinator};

use crate::chunk::encode_chunk;
use crate::freq::{count_frequencies, merge_frequencies};
use crate::merge::{merge_streams, EncodedChunk};
use crate::tree::{build_tree, extract_codes, CodeTable};
use crate::MAX_SYMBOLS;

/// Byte range `[start, end)` owned by one rank.
pub(crate) fn rank_range(rank: usize, worker_count: usize, total_len: usize) -> (usize, usize) {
    let start = rank * total_len / worker_count;
    let end = (rank + 1) * total_len / worker_count;
    (start, end)
}

/// Runs a full parallel encode over `coordinator`'s workers: each rank
/// histograms and packs its own byte range, the histograms are summed to
/// build one global code table, every rank re-packs its range against that
/// table, and the per-rank bit-streams are spliced together in rank order.
///
/// Two passes over each rank's data are unavoidable here because the code
/// table is a function of the *global* histogram: a rank cannot know its
/// final code lengths until every other rank's counts are in.
pub(crate) fn parallel_encode<C: WorkerCoordinator>(
    coordinator: &C,
    input: Arc<[u8]>,
) -> Result<(CodeTable, Vec<u8>, u8, u32), HuffmanError> {
    let worker_count = coordinator.worker_count().max(1);
    let total_len = input.len();

    let shared = coordinator.broadcast(Arc::clone(&input));
    debug_assert_eq!(shared.len(), worker_count);

    let histograms: Vec<[u64; MAX_SYMBOLS]> = coordinator.gather_in_order(|rank| {
        let (start, end) = rank_range(rank, worker_count, total_len);
        count_frequencies(&input[start..end])
    })?;

    let global_freq = merge_frequencies(histograms);
    let Some(tree) = build_tree(&global_freq) else {
        return Ok((vec![None; MAX_SYMBOLS], Vec::new(), 0, 0));
    };
    let table = extract_codes(&tree);

    let chunk_results: Vec<Result<(Vec<u8>, u8), HuffmanError>> =
        coordinator.gather_in_order(|rank| {
            let (start, end) = rank_range(rank, worker_count, total_len);
            encode_chunk(&table, &input[start..end])
        })?;

    let mut chunks = Vec::with_capacity(chunk_results.len());
    for result in chunk_results {
        let (bytes, tail_pad) = result?;
        chunks.push(EncodedChunk { bytes, tail_pad });
    }

    let (merged, tail_pad) = merge_streams(&chunks);
    Ok((table, merged, tail_pad, total_len as u32))
}
