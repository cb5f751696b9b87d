//! Streaming decode (C8): walks the tree one bit at a time, emitting a byte
//! each time a leaf is reached, until `decoded_byte_count` bytes have been
//! produced. The bit-stream may legitimately carry trailing pad bits past
//! the last symbol — decoding stops as soon as the declared count is met,
//! it does not require the stream to be exactly consumed.

use shared_files::HuffmanError;

use crate::bits::get_bit;
use crate::tree::{rebuild_from_table, CodeTable, Node, Tree};

/// Decodes `bitstream` against `table`, stopping after `decoded_byte_count`
/// bytes. Fails with [`HuffmanError::Truncated`] if the stream runs out of
/// bits before that many bytes have been emitted.
pub(crate) fn decode_stream(
    table: &CodeTable,
    bitstream: &[u8],
    decoded_byte_count: u32,
) -> Result<Vec<u8>, HuffmanError> {
    if decoded_byte_count == 0 {
        return Ok(Vec::new());
    }

    let tree = rebuild_from_table(table)?;
    let requested = decoded_byte_count as usize;
    if requested > isize::MAX as usize {
        return Err(HuffmanError::AllocFailure { requested });
    }
    let mut out = Vec::with_capacity(requested);
    let total_bits = bitstream.len() as u64 * 8;
    let mut cursor: u64 = 0;
    let mut node = tree.root;

    while (out.len() as u32) < decoded_byte_count {
        if cursor >= total_bits {
            return Err(HuffmanError::Truncated {
                expected: decoded_byte_count,
                got: out.len() as u32,
            });
        }
        let bit = get_bit(bitstream, cursor);
        cursor += 1;
        node = descend(&tree, node, bit)?;
        if let Node::Leaf { symbol, .. } = tree.nodes[node] {
            out.push(symbol);
            node = tree.root;
        }
    }

    Ok(out)
}

fn descend(tree: &Tree, node: usize, bit: u8) -> Result<usize, HuffmanError> {
    match tree.nodes[node] {
        Node::Internal { zero, one, .. } => Ok(if bit == 0 { zero } else { one }),
        Node::Leaf { .. } => Err(HuffmanError::MalformedTable(
            "bit-stream descends past a leaf".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::encode_chunk;
    use crate::tree::{build_tree, extract_codes};
    use crate::MAX_SYMBOLS;

    fn table_for(data: &[u8]) -> CodeTable {
        let mut freq = [0u64; MAX_SYMBOLS];
        for &b in data {
            freq[b as usize] += 1;
        }
        extract_codes(&build_tree(&freq).unwrap())
    }

    #[test]
    fn decodes_what_was_encoded() {
        let data = b"mississippi river";
        let table = table_for(data);
        let (packed, _tail_pad) = encode_chunk(&table, data).unwrap();
        let decoded = decode_stream(&table, &packed, data.len() as u32).unwrap();
        assert_eq!(&decoded, data);
    }

    #[test]
    fn empty_stream_decodes_to_empty() {
        let table = table_for(b"a");
        let decoded = decode_stream(&table, &[], 0).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn truncated_stream_is_reported() {
        let data = b"aaaabbbc";
        let table = table_for(data);
        let (packed, _tail_pad) = encode_chunk(&table, data).unwrap();
        let short = &packed[..packed.len().saturating_sub(1).max(1)];
        let err = decode_stream(&table, short, (data.len() + 10) as u32).unwrap_err();
        assert!(matches!(err, HuffmanError::Truncated { .. }));
    }

    #[test]
    fn a_declared_length_that_outruns_the_stream_is_rejected_rather_than_allocated_blindly() {
        let table = table_for(b"a");
        let err = decode_stream(&table, &[], u32::MAX).unwrap_err();
        assert!(matches!(
            err,
            HuffmanError::Truncated { .. } | HuffmanError::AllocFailure { .. }
        ));
    }

    #[test]
    fn single_symbol_round_trips() {
        let data = b"zzzzzzzz";
        let table = table_for(data);
        let (packed, _tail_pad) = encode_chunk(&table, data).unwrap();
        let decoded = decode_stream(&table, &packed, data.len() as u32).unwrap();
        assert_eq!(&decoded, data);
    }
}
