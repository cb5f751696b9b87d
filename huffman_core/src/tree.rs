//! Canonical Huffman tree construction (C3) and code extraction (C4).
//!
//! Nodes live in a flat arena addressed by index rather than behind
//! `Box`/`Rc` with parent back-links: the reference implementation's
//! child-to-parent cycle is only ever used to walk a leaf up to the root,
//! which a top-down recursion with an accumulator does without needing a
//! back-link at all.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use shared_files::HuffmanError;

use crate::MAX_SYMBOLS;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Node {
    Leaf { symbol: u8, count: u64 },
    Internal { count: u64, zero: usize, one: usize },
}

impl Node {
    fn count(&self) -> u64 {
        match *self {
            Node::Leaf { count, .. } => count,
            Node::Internal { count, .. } => count,
        }
    }
}

/// A Huffman tree as a flat arena of [`Node`]s. `root` indexes the entry
/// that has no parent.
pub(crate) struct Tree {
    pub nodes: Vec<Node>,
    pub root: usize,
}

/// Priority-queue entry: smallest count first, ties broken by the order in
/// which the entry was created (earlier wins), so the tie-break is a
/// deterministic, stable function of the histogram alone.
struct HeapEntry {
    count: u64,
    sequence: u64,
    node_index: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.sequence == other.sequence
    }
}
impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest count (and then
        // the earliest sequence number) sorts to the top.
        other
            .count
            .cmp(&self.count)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds a Huffman tree from a 256-entry histogram using the classic
/// two-smallest merge. Returns `None` if every frequency is zero (empty
/// input — there is no tree).
pub(crate) fn build_tree(frequencies: &[u64; MAX_SYMBOLS]) -> Option<Tree> {
    let mut nodes = Vec::new();
    let mut heap = BinaryHeap::new();
    let mut sequence = 0u64;

    for (symbol, &count) in frequencies.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let idx = nodes.len();
        nodes.push(Node::Leaf {
            symbol: symbol as u8,
            count,
        });
        heap.push(HeapEntry {
            count,
            sequence,
            node_index: idx,
        });
        sequence += 1;
    }

    if heap.is_empty() {
        return None;
    }

    while heap.len() > 1 {
        let a = heap.pop().unwrap();
        let b = heap.pop().unwrap();
        let combined_count = a.count + b.count;
        let idx = nodes.len();
        nodes.push(Node::Internal {
            count: combined_count,
            zero: a.node_index,
            one: b.node_index,
        });
        heap.push(HeapEntry {
            count: combined_count,
            sequence,
            node_index: idx,
        });
        sequence += 1;
    }

    let root = heap.pop().unwrap().node_index;
    Some(Tree { nodes, root })
}

/// A symbol's variable-length code: `numbits` meaningful bits packed
/// LSB-first-within-byte into `bits`, zero-padded in the trailing byte.
#[derive(Debug, Clone)]
pub struct Code {
    pub numbits: u32,
    pub bits: Vec<u8>,
}

/// Sparse code table: `table[symbol]` is `Some(code)` for every symbol
/// present in the frequency histogram the tree was built from.
pub type CodeTable = Vec<Option<Code>>;

/// Walks the tree top-down, accumulating one bit per level, to produce the
/// code for every leaf. A single-leaf tree (one distinct symbol) is given
/// a one-bit code rather than a zero-length one, per the resolved Open
/// Question on single-symbol inputs.
pub(crate) fn extract_codes(tree: &Tree) -> CodeTable {
    let mut table: CodeTable = vec![None; MAX_SYMBOLS];

    if let Node::Leaf { symbol, .. } = tree.nodes[tree.root] {
        table[symbol as usize] = Some(Code {
            numbits: 1,
            bits: vec![0],
        });
        return table;
    }

    // depth-first walk carrying an accumulator (bits, depth); bits packed
    // LSB-first-within-byte as we descend.
    let mut stack: Vec<(usize, u32, Vec<u8>)> = vec![(tree.root, 0, Vec::new())];
    while let Some((node_index, depth, acc)) = stack.pop() {
        match tree.nodes[node_index] {
            Node::Leaf { symbol, .. } => {
                table[symbol as usize] = Some(Code {
                    numbits: depth,
                    bits: acc,
                });
            }
            Node::Internal { zero, one, .. } => {
                stack.push((zero, depth + 1, push_bit(&acc, depth, 0)));
                stack.push((one, depth + 1, push_bit(&acc, depth, 1)));
            }
        }
    }

    table
}

fn push_bit(acc: &[u8], depth: u32, bit: u8) -> Vec<u8> {
    let depth = depth as u64;
    let mut out = vec![0u8; crate::bits::bytes_from_bits(depth + 1)];
    out[..acc.len()].copy_from_slice(acc);
    crate::bits::set_bit(&mut out, depth, bit);
    out
}

/// Reconstructs a tree's arena from a code table, as the container reader
/// does. Used directly by decode, and exercised independently in tests.
pub(crate) fn rebuild_from_table(table: &CodeTable) -> Result<Tree, HuffmanError> {
    let mut nodes = vec![Node::Internal {
        count: 0,
        zero: usize::MAX,
        one: usize::MAX,
    }];
    let root = 0;

    for (symbol, code) in table.iter().enumerate() {
        let Some(code) = code else { continue };
        if code.numbits == 0 {
            return Err(HuffmanError::MalformedTable(format!(
                "symbol {symbol} has a zero-length code"
            )));
        }
        let mut cur = root;
        for bit_index in 0..code.numbits {
            let bit = crate::bits::get_bit(&code.bits, bit_index as u64);
            let is_last = bit_index + 1 == code.numbits;
            let child = match (nodes[cur], bit) {
                (Node::Internal { zero, .. }, 0) => zero,
                (Node::Internal { one, .. }, _) => one,
                (Node::Leaf { .. }, _) => {
                    return Err(HuffmanError::MalformedTable(format!(
                        "code for symbol {symbol} passes through an existing leaf"
                    )));
                }
            };
            if child == usize::MAX {
                let new_idx = nodes.len();
                nodes.push(if is_last {
                    Node::Leaf {
                        symbol: symbol as u8,
                        count: 0,
                    }
                } else {
                    Node::Internal {
                        count: 0,
                        zero: usize::MAX,
                        one: usize::MAX,
                    }
                });
                match (&mut nodes[cur], bit) {
                    (Node::Internal { zero, .. }, 0) => *zero = new_idx,
                    (Node::Internal { one, .. }, _) => *one = new_idx,
                    _ => unreachable!(),
                }
                cur = new_idx;
            } else {
                if is_last {
                    return Err(HuffmanError::MalformedTable(format!(
                        "code for symbol {symbol} collides with an existing node"
                    )));
                }
                if matches!(nodes[child], Node::Leaf { .. }) {
                    return Err(HuffmanError::MalformedTable(format!(
                        "code for symbol {symbol} would overwrite an existing leaf"
                    )));
                }
                cur = child;
            }
        }
    }

    Ok(Tree { nodes, root })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(pairs: &[(u8, u64)]) -> [u64; MAX_SYMBOLS] {
        let mut freq = [0u64; MAX_SYMBOLS];
        for &(symbol, count) in pairs {
            freq[symbol as usize] = count;
        }
        freq
    }

    #[test]
    fn empty_histogram_has_no_tree() {
        let freq = histogram(&[]);
        assert!(build_tree(&freq).is_none());
    }

    #[test]
    fn single_symbol_gets_one_bit_code() {
        let freq = histogram(&[(b'a', 4)]);
        let tree = build_tree(&freq).unwrap();
        let table = extract_codes(&tree);
        let code = table[b'a' as usize].as_ref().unwrap();
        assert_eq!(code.numbits, 1);
    }

    #[test]
    fn two_symbols_get_length_one_codes() {
        let freq = histogram(&[(b'a', 2), (b'b', 6)]);
        let tree = build_tree(&freq).unwrap();
        let table = extract_codes(&tree);
        assert_eq!(table[b'a' as usize].as_ref().unwrap().numbits, 1);
        assert_eq!(table[b'b' as usize].as_ref().unwrap().numbits, 1);
    }

    #[test]
    fn code_lengths_respect_frequency_order() {
        // a rare symbol should never get a shorter code than a common one.
        let freq = histogram(&[(b'a', 1), (b'b', 1), (b'c', 2), (b'd', 10)]);
        let tree = build_tree(&freq).unwrap();
        let table = extract_codes(&tree);
        let len = |s: u8| table[s as usize].as_ref().unwrap().numbits;
        assert!(len(b'd') <= len(b'c'));
        assert!(len(b'c') <= len(b'a'));
        assert!(len(b'c') <= len(b'b'));
    }

    #[test]
    fn rebuild_from_table_round_trips_codes() {
        let freq = histogram(&[(0, 5), (1, 3), (2, 2), (3, 1)]);
        let tree = build_tree(&freq).unwrap();
        let table = extract_codes(&tree);
        let rebuilt = rebuild_from_table(&table).unwrap();
        // every leaf in the rebuilt tree should carry the symbol whose code
        // path led to it.
        for (symbol, code) in table.iter().enumerate() {
            let Some(code) = code else { continue };
            let mut cur = rebuilt.root;
            for bit_index in 0..code.numbits {
                let bit = crate::bits::get_bit(&code.bits, bit_index as u64);
                cur = match (rebuilt.nodes[cur], bit) {
                    (Node::Internal { zero, .. }, 0) => zero,
                    (Node::Internal { one, .. }, _) => one,
                    _ => panic!("path ended early"),
                };
            }
            match rebuilt.nodes[cur] {
                Node::Leaf { symbol: s, .. } => assert_eq!(s as usize, symbol),
                _ => panic!("expected leaf"),
            }
        }
    }

    #[test]
    fn rebuild_rejects_conflicting_codes() {
        let mut table: CodeTable = vec![None; MAX_SYMBOLS];
        table[0] = Some(Code {
            numbits: 1,
            bits: vec![0],
        });
        // symbol 1 claims the same one-bit code path through to a leaf that
        // symbol 0 already owns, then tries to extend past it.
        table[1] = Some(Code {
            numbits: 2,
            bits: vec![0b01],
        });
        assert!(rebuild_from_table(&table).is_err());
    }
}
