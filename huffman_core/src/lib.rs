//! Canonical Huffman coding over arbitrary byte streams, encoded either
//! sequentially or by fanning work out across a [`WorkerCoordinator`].
//!
//! The crate is organized bottom-up: [`bits`] and [`tree`] are the
//! algorithmic core, [`container`] serializes/parses the on-disk format,
//! [`chunk`]/[`decode`]/[`merge`] do the per-chunk bit-packing and stitching,
//! and [`parallel`] drives all of that against an injected
//! [`WorkerCoordinator`]. [`encode`] and [`decode`] are the crate's two
//! public entry points.

mod bits;
mod cache;
mod chunk;
mod container;
mod decode;
mod freq;
mod merge;
mod parallel;
mod tree;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use shared_files::stats::{CompressionStats, CompressionStatsBuilder, StatsTimer};
use shared_files::{HuffmanError, HuffmanResult, WorkerCoordinator};

/// Number of distinct byte values a symbol can take.
pub const MAX_SYMBOLS: usize = 256;

/// Algorithm identifier recorded in [`CompressionStats`]; there is only one
/// algorithm in this crate, so the id is a constant rather than a parameter.
const ALGORITHM_NAME: &str = "huffman";
const ALGORITHM_ID: u8 = 1;
const FORMAT_VERSION: u8 = 1;

/// Knobs for [`encode`]. Decode needs none of these: the container is fully
/// self-describing.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Number of workers to partition the input across. `1` runs the same
    /// parallel driver with a single rank, which is equivalent to a
    /// sequential encode.
    pub worker_count: usize,
    /// Whether to collect and return timing/ratio statistics.
    pub collect_stats: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            worker_count: 1,
            collect_stats: false,
        }
    }
}

/// Result of a successful [`encode`] call.
pub struct EncodeOutcome {
    /// The serialized container: header, code table, bit-stream.
    pub container: Vec<u8>,
    /// Populated when [`EncodeOptions::collect_stats`] was set.
    pub stats: Option<CompressionStats>,
}

/// Result of a successful [`decode`] call.
pub struct DecodeOutcome {
    /// The recovered bytes.
    pub data: Vec<u8>,
    /// Populated when `collect_stats` was set on the call.
    pub stats: Option<CompressionStats>,
}

/// Encodes `input` into a self-describing container using `coordinator` to
/// fan work out across `options.worker_count` ranks.
pub fn encode<C: WorkerCoordinator>(
    input: &[u8],
    coordinator: &C,
    options: &EncodeOptions,
) -> HuffmanResult<EncodeOutcome> {
    let mut timer = StatsTimer::new();
    debug!(
        "encoding {} bytes across {} workers",
        input.len(),
        coordinator.worker_count()
    );

    let partition_timer = timer.start_section("partition and histogram");
    let owned: Arc<[u8]> = Arc::from(input);
    timer.add_section(partition_timer.end());

    let encode_timer = timer.start_section("encode and merge");
    let (table, bitstream, _tail_pad, decoded_byte_count) =
        parallel::parallel_encode(coordinator, owned)?;
    timer.add_section(encode_timer.end());

    let header_timer = timer.start_section("serialize header");
    let header = container::write_header(&table, decoded_byte_count)?;
    timer.add_section(header_timer.end());

    let mut container = header;
    container.extend_from_slice(&bitstream);

    let (total_duration, sections) = timer.end();
    info!(
        "encoded {} bytes into {} bytes in {:?}",
        input.len(),
        container.len(),
        total_duration
    );

    let stats = if options.collect_stats {
        Some(build_stats(
            input.len(),
            container.len(),
            total_duration,
            true,
            sections,
        )?)
    } else {
        None
    };

    Ok(EncodeOutcome { container, stats })
}

/// Decodes a container produced by [`encode`]. `collect_stats` controls
/// whether timing/ratio statistics are returned alongside the data.
pub fn decode(container: &[u8], collect_stats: bool) -> HuffmanResult<DecodeOutcome> {
    let mut timer = StatsTimer::new();

    let header_timer = timer.start_section("parse header");
    let header = container::read_header(container)?;
    timer.add_section(header_timer.end());

    let bitstream = &container[header.bitstream_offset..];

    let decode_timer = timer.start_section("decode stream");
    let data = decode::decode_stream(&header.table, bitstream, header.decoded_byte_count)?;
    timer.add_section(decode_timer.end());

    let (total_duration, sections) = timer.end();
    info!(
        "decoded {} bytes from a {}-byte container in {:?}",
        data.len(),
        container.len(),
        total_duration
    );

    let stats = if collect_stats {
        Some(build_stats(
            container.len(),
            data.len(),
            total_duration,
            false,
            sections,
        )?)
    } else {
        None
    };

    Ok(DecodeOutcome { data, stats })
}

fn build_stats(
    original_len: usize,
    processed_len: usize,
    duration: Duration,
    is_compression: bool,
    sections: Vec<shared_files::stats::SectionStats>,
) -> HuffmanResult<CompressionStats> {
    CompressionStatsBuilder::new()
        .algorithm_name(ALGORITHM_NAME)
        .algorithm_id(ALGORITHM_ID)
        .version_used(FORMAT_VERSION)
        .original_len(original_len)
        .processed_len(processed_len)
        .duration(duration)
        .is_compression(is_compression)
        .sections(sections)
        .build()
        .map_err(|e| HuffmanError::BadArgs(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    struct SequentialCoordinator {
        worker_count: usize,
    }

    impl WorkerCoordinator for SequentialCoordinator {
        fn worker_count(&self) -> usize {
            self.worker_count
        }

        fn gather_in_order<T, F>(&self, produce: F) -> HuffmanResult<Vec<T>>
        where
            T: Send,
            F: Fn(usize) -> T + Sync,
        {
            Ok((0..self.worker_count).map(produce).collect())
        }
    }

    #[test]
    fn encode_decode_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog, repeatedly, repeatedly";
        let coordinator = SequentialCoordinator { worker_count: 1 };
        let outcome = encode(data, &coordinator, &EncodeOptions::default()).unwrap();
        let decoded = decode(&outcome.container, false).unwrap();
        assert_eq!(decoded.data, data);
    }

    #[test]
    fn encode_decode_round_trips_with_multiple_workers() {
        let data = b"abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz0123456789";
        for worker_count in [1, 2, 4, 8] {
            let coordinator = SequentialCoordinator { worker_count };
            let outcome = encode(data, &coordinator, &EncodeOptions::default()).unwrap();
            let decoded = decode(&outcome.container, false).unwrap();
            assert_eq!(decoded.data, &data[..], "worker_count={worker_count}");
        }
    }

    #[test]
    fn empty_input_round_trips() {
        let coordinator = SequentialCoordinator { worker_count: 3 };
        let outcome = encode(&[], &coordinator, &EncodeOptions::default()).unwrap();
        let decoded = decode(&outcome.container, false).unwrap();
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn single_symbol_input_round_trips() {
        let data = vec![7u8; 500];
        let coordinator = SequentialCoordinator { worker_count: 4 };
        let outcome = encode(&data, &coordinator, &EncodeOptions::default()).unwrap();
        let decoded = decode(&outcome.container, false).unwrap();
        assert_eq!(decoded.data, data);
    }

    #[test]
    fn random_data_round_trips() {
        let mut rng = StdRng::seed_from_u64(42);
        let data: Vec<u8> = (0..5000).map(|_| rng.r#gen()).collect();
        let coordinator = SequentialCoordinator { worker_count: 4 };
        let outcome = encode(&data, &coordinator, &EncodeOptions::default()).unwrap();
        let decoded = decode(&outcome.container, false).unwrap();
        assert_eq!(decoded.data, data);
    }

    #[test]
    fn collecting_stats_reports_original_and_processed_len() {
        let data = b"aaaaaaaaaabbbbbbbbbbcccccccccc";
        let coordinator = SequentialCoordinator { worker_count: 2 };
        let options = EncodeOptions {
            worker_count: 2,
            collect_stats: true,
        };
        let outcome = encode(data, &coordinator, &options).unwrap();
        let stats = outcome.stats.expect("stats requested");
        assert_eq!(stats.original_len, data.len());
        assert_eq!(stats.processed_len, outcome.container.len());
    }

    #[test]
    fn malformed_container_is_rejected() {
        let err = decode(&[0, 0], false).unwrap_err();
        assert!(matches!(err, HuffmanError::BadHeader(_)));
    }

    #[test]
    fn truncated_bitstream_is_rejected() {
        let data = b"aaaabbbccd";
        let coordinator = SequentialCoordinator { worker_count: 1 };
        let outcome = encode(data, &coordinator, &EncodeOptions::default()).unwrap();
        let truncated = &outcome.container[..outcome.container.len() - 1];
        let err = decode(truncated, false).unwrap_err();
        assert!(matches!(err, HuffmanError::Truncated { .. }));
    }
}
