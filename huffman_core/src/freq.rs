//! Frequency analysis (C2): a single pass over a byte range producing a
//! 256-entry histogram. Usable over the whole input (sequential encode) or
//! per-chunk, in which case per-worker histograms are summed element-wise
//! to form the global histogram the tree is built from.

use crate::MAX_SYMBOLS;

/// Counts occurrences of each byte value in `data`.
pub fn count_frequencies(data: &[u8]) -> [u64; MAX_SYMBOLS] {
    let mut freq = [0u64; MAX_SYMBOLS];
    for &byte in data {
        freq[byte as usize] += 1;
    }
    freq
}

/// Element-wise sum of several per-chunk histograms into one global
/// histogram, equivalent to (but cheaper in parallel than) a single pass
/// over the whole input.
pub fn merge_frequencies(parts: impl IntoIterator<Item = [u64; MAX_SYMBOLS]>) -> [u64; MAX_SYMBOLS] {
    let mut total = [0u64; MAX_SYMBOLS];
    for part in parts {
        for (t, p) in total.iter_mut().zip(part.iter()) {
            *t += p;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_byte() {
        let freq = count_frequencies(b"aabbbbbb");
        assert_eq!(freq[b'a' as usize], 2);
        assert_eq!(freq[b'b' as usize], 6);
        assert_eq!(freq.iter().sum::<u64>(), 8);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let freq = count_frequencies(&[]);
        assert!(freq.iter().all(|&c| c == 0));
    }

    #[test]
    fn merge_matches_single_pass() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let whole = count_frequencies(data);
        let (left, right) = data.split_at(data.len() / 2);
        let merged = merge_frequencies([count_frequencies(left), count_frequencies(right)]);
        assert_eq!(whole, merged);
    }
}
