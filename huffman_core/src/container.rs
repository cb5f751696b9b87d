//! Container header serialization (C5) and parsing (C6).
//!
//! ```text
//! offset  size      field
//!   0     4          entry_count (u32 BE)
//!   4     4          decoded_byte_count (u32 BE)
//!   8     variable   code table: per entry, symbol(1) + length(1) + ceil(length/8) packed bits
//!  ...    variable   bit-stream
//! ```

use shared_files::HuffmanError;

use crate::bits::bytes_from_bits;
use crate::cache::ByteCache;
use crate::tree::{Code, CodeTable};
use crate::MAX_SYMBOLS;

/// Serializes the header (entry count, decoded byte count, code table) for
/// `decoded_byte_count` bytes of input encoded against `table`.
pub(crate) fn write_header(table: &CodeTable, decoded_byte_count: u32) -> Result<Vec<u8>, HuffmanError> {
    let mut cache = ByteCache::new();

    let entry_count = table.iter().filter(|c| c.is_some()).count() as u32;
    cache.write(&entry_count.to_be_bytes());
    cache.write(&decoded_byte_count.to_be_bytes());

    for (symbol, code) in table.iter().enumerate() {
        let Some(code) = code else { continue };
        if code.numbits == 0 || code.numbits > 255 {
            return Err(HuffmanError::MalformedTable(format!(
                "symbol {symbol} has an unrepresentable code length {}",
                code.numbits
            )));
        }
        cache.write(&[symbol as u8, code.numbits as u8]);
        cache.write(&code.bits[..bytes_from_bits(code.numbits as u64)]);
    }

    Ok(cache.finish())
}

/// The parsed container header: the code table and the declared decoded
/// byte count, plus the byte offset where the bit-stream begins.
pub(crate) struct Header {
    pub table: CodeTable,
    pub decoded_byte_count: u32,
    pub bitstream_offset: usize,
}

/// Parses a container's header (C6).
pub(crate) fn read_header(container: &[u8]) -> Result<Header, HuffmanError> {
    let mut cursor = Cursor::new(container);

    let entry_count = cursor.read_u32()?;
    let decoded_byte_count = cursor.read_u32()?;

    let mut table: CodeTable = vec![None; MAX_SYMBOLS];
    for _ in 0..entry_count {
        let symbol = cursor.read_u8()?;
        let numbits = cursor.read_u8()?;
        if numbits == 0 {
            return Err(HuffmanError::MalformedTable(format!(
                "symbol {symbol} declares a zero-length code"
            )));
        }
        let numbytes = bytes_from_bits(numbits as u64);
        let bits = cursor.read_bytes(numbytes)?.to_vec();
        if table[symbol as usize].is_some() {
            return Err(HuffmanError::MalformedTable(format!(
                "symbol {symbol} appears twice in the code table"
            )));
        }
        table[symbol as usize] = Some(Code {
            numbits: numbits as u32,
            bits,
        });
    }

    Ok(Header {
        table,
        decoded_byte_count,
        bitstream_offset: cursor.pos,
    })
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], HuffmanError> {
        if self.pos + n > self.buf.len() {
            return Err(HuffmanError::BadHeader(format!(
                "expected {n} more bytes at offset {}, container has {} bytes",
                self.pos,
                self.buf.len()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, HuffmanError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, HuffmanError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_entry_table(symbol: u8, numbits: u32, bits: Vec<u8>) -> CodeTable {
        let mut table: CodeTable = vec![None; MAX_SYMBOLS];
        table[symbol as usize] = Some(Code { numbits, bits });
        table
    }

    #[test]
    fn round_trips_header() {
        let table = single_entry_table(b'a', 3, vec![0b101]);
        let bytes = write_header(&table, 4).unwrap();
        let header = read_header(&bytes).unwrap();
        assert_eq!(header.decoded_byte_count, 4);
        let code = header.table[b'a' as usize].as_ref().unwrap();
        assert_eq!(code.numbits, 3);
        assert_eq!(code.bits, vec![0b101]);
    }

    #[test]
    fn empty_table_round_trips() {
        let table: CodeTable = vec![None; MAX_SYMBOLS];
        let bytes = write_header(&table, 0).unwrap();
        let header = read_header(&bytes).unwrap();
        assert_eq!(header.decoded_byte_count, 0);
        assert!(header.table.iter().all(|c| c.is_none()));
    }

    #[test]
    fn truncated_header_is_bad_header() {
        let err = read_header(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, HuffmanError::BadHeader(_)));
    }

    #[test]
    fn duplicate_symbol_is_malformed() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_be_bytes()); // entry_count
        bytes.extend_from_slice(&1u32.to_be_bytes()); // decoded_byte_count
        bytes.extend_from_slice(&[b'a', 1, 0b1]);
        bytes.extend_from_slice(&[b'a', 1, 0b0]);
        let err = read_header(&bytes).unwrap_err();
        assert!(matches!(err, HuffmanError::MalformedTable(_)));
    }
}
