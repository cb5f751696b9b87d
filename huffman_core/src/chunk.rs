//! Chunked encoding (C7): packs one byte range against a code table into a
//! bit-stream, LSB-first-within-byte, with the trailing byte's unused high
//! bits left zeroed. The number of those unused bits (`tail_pad`, 0-7) is
//! returned alongside the packed bytes so independently encoded chunks can
//! later be spliced back together by the merger without byte-alignment
//! artifacts.

use shared_files::HuffmanError;

use crate::bits::{bytes_from_bits, set_bit};
use crate::tree::CodeTable;

/// Encodes `data` against `table`, returning the packed bit-stream and the
/// number of zero-padding bits in its final byte.
pub(crate) fn encode_chunk(table: &CodeTable, data: &[u8]) -> Result<(Vec<u8>, u8), HuffmanError> {
    let mut total_bits: u64 = 0;
    for &byte in data {
        let code = table[byte as usize]
            .as_ref()
            .ok_or_else(|| HuffmanError::MalformedTable(format!("no code for byte {byte}")))?;
        total_bits += code.numbits as u64;
    }

    let mut out = vec![0u8; bytes_from_bits(total_bits)];
    let mut cursor: u64 = 0;
    for &byte in data {
        let code = table[byte as usize].as_ref().unwrap();
        for bit_index in 0..code.numbits {
            let bit = crate::bits::get_bit(&code.bits, bit_index as u64);
            set_bit(&mut out, cursor, bit);
            cursor += 1;
        }
    }

    let tail_pad = if total_bits % 8 == 0 {
        0
    } else {
        (8 - total_bits % 8) as u8
    };
    Ok((out, tail_pad))
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn bit_count_matches_sum_of_code_lengths() {
        let data = b"aaabbc";
        let table = table_for(data);
        let (packed, tail_pad) = encode_chunk(&table, data).unwrap();
        let total_bits: u32 = data
            .iter()
            .map(|&b| table[b as usize].as_ref().unwrap().numbits)
            .sum();
        assert_eq!(packed.len(), bytes_from_bits(total_bits as u64));
        assert_eq!((packed.len() as u32 * 8 - tail_pad as u32), total_bits);
    }

    #[test]
    fn empty_data_produces_empty_stream() {
        let table = table_for(b"ab");
        let (packed, tail_pad) = encode_chunk(&table, &[]).unwrap();
        assert!(packed.is_empty());
        assert_eq!(tail_pad, 0);
    }

    #[test]
    fn unknown_symbol_is_malformed_table() {
        let table = table_for(b"a");
        let err = encode_chunk(&table, b"z").unwrap_err();
        assert!(matches!(err, HuffmanError::MalformedTable(_)));
    }
}
