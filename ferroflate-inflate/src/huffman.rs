//! Canonical Huffman codes for DEFLATE decoding.
//!
//! DEFLATE transmits Huffman codes as bare code-length arrays; the actual
//! codewords are reconstructed canonically (RFC 1951 §3.2.2): codes of the
//! same length take consecutive values in ascending symbol order, and the
//! first code of each length follows from the counts of all shorter codes.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-285 (0-255 literals, 256 end-of-block, 257-285 lengths)
//! - **Distance**: 0-29
//! - **Code Length**: 0-18 (describing the other two in dynamic blocks)

use ferroflate_core::bitstream::{BitOrder, BitReader};
use ferroflate_core::error::{Error, Result};
use std::io::Read;

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// End of block symbol in the literal/length alphabet.
pub const END_OF_BLOCK: u16 = 256;

/// Number of bits resolved by the direct lookup table.
const FAST_BITS: u8 = 8;

/// A canonical codeword assigned to one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    /// The symbol the codeword decodes to.
    pub symbol: u16,
    /// Codeword value, MSB-first over `len` bits.
    pub code: u16,
    /// Codeword length in bits (1-15).
    pub len: u8,
}

/// An immutable symbol table built from a code-length array.
///
/// Decoding is two-tier: a 256-entry table keyed by the next 8 stream bits
/// resolves every codeword of up to 8 bits in one probe; anything longer
/// (or a read near the end of the input, where 8 bits cannot be peeked)
/// falls back to probing the codeword list in canonical order against the
/// reader.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Canonical codeword per symbol; `None` for unused symbols.
    codes: Vec<Option<Codeword>>,
    /// Direct lookup keyed by the next `FAST_BITS` stream bits
    /// (bit-reversed codewords); `len == 0` marks a miss.
    fast: Vec<(u16, u8)>,
    /// All assigned codewords sorted by (len, code) for prefix probing.
    probe_order: Vec<Codeword>,
    /// Longest assigned codeword, 0 for an empty table.
    max_len: u8,
}

impl HuffmanTable {
    /// Build a table from code lengths, where `code_lengths[i]` is the bit
    /// length for symbol `i` and 0 marks an unused symbol.
    ///
    /// Construction is mechanical: incomplete or over-subscribed length
    /// sets are not rejected here, since a stream referencing a gap in the
    /// code space fails at decode time with [`Error::SymbolDecode`]. That
    /// matches the failure model of the block decoder, where corrupt
    /// tables are indistinguishable from corrupt data until a symbol is
    /// actually read.
    ///
    /// # Panics
    ///
    /// Panics if any length exceeds 15; a DEFLATE stream cannot express
    /// one, so this only guards direct API misuse.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Self {
        let mut bl_count = [0u32; MAX_CODE_LENGTH + 1];
        let mut max_len = 0u8;

        for &len in code_lengths {
            assert!(
                len as usize <= MAX_CODE_LENGTH,
                "code length {} exceeds maximum {}",
                len,
                MAX_CODE_LENGTH
            );
            if len > 0 {
                bl_count[len as usize] += 1;
                max_len = max_len.max(len);
            }
        }

        if max_len == 0 {
            return Self {
                codes: vec![None; code_lengths.len()],
                fast: vec![(0, 0); 1 << FAST_BITS],
                probe_order: Vec::new(),
                max_len: 0,
            };
        }

        // First code of each length (RFC 1951 §3.2.2).
        let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
        let mut code = 0u32;
        for bits in 1..=max_len as usize {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        // Assign codewords in ascending symbol order.
        let mut codes: Vec<Option<Codeword>> = vec![None; code_lengths.len()];
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len > 0 {
                codes[symbol] = Some(Codeword {
                    symbol: symbol as u16,
                    code: next_code[len as usize] as u16,
                    len,
                });
                next_code[len as usize] += 1;
            }
        }

        // Direct lookup: each codeword of up to FAST_BITS bits fills every
        // slot whose low bits match its reversed value.
        let mut fast = vec![(0u16, 0u8); 1 << FAST_BITS];
        for cw in codes.iter().flatten() {
            if cw.len <= FAST_BITS {
                let reversed = Self::reverse_bits(cw.code, cw.len) as usize;
                let fill = 1usize << (FAST_BITS - cw.len);
                for i in 0..fill {
                    fast[reversed | (i << cw.len)] = (cw.symbol, cw.len);
                }
            }
        }

        let mut probe_order: Vec<Codeword> = codes.iter().flatten().copied().collect();
        probe_order.sort_by_key(|cw| (cw.len, cw.code));

        Self {
            codes,
            fast,
            probe_order,
            max_len,
        }
    }

    /// Reverse the low `len` bits of `code`.
    fn reverse_bits(mut code: u16, len: u8) -> u16 {
        let mut reversed = 0u16;
        for _ in 0..len {
            reversed = (reversed << 1) | (code & 1);
            code >>= 1;
        }
        reversed
    }

    /// The canonical `(code, len)` assigned to `symbol`, if any.
    pub fn code_of(&self, symbol: u16) -> Option<(u16, u8)> {
        self.codes
            .get(symbol as usize)
            .copied()
            .flatten()
            .map(|cw| (cw.code, cw.len))
    }

    /// All assigned codewords, sorted by (length, code).
    pub fn codewords(&self) -> &[Codeword] {
        &self.probe_order
    }

    /// Longest assigned codeword length, 0 for an empty table.
    pub fn max_code_length(&self) -> u8 {
        self.max_len
    }

    /// Decode one symbol from the reader.
    ///
    /// Fails with [`Error::SymbolDecode`] if no codeword is a prefix of the
    /// upcoming bits, or [`Error::EndOfStream`] if the input runs out
    /// before any codeword can complete.
    #[inline]
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        if self.max_len == 0 {
            return Err(Error::symbol_decode(reader.bit_position()));
        }

        if reader.has_bits(FAST_BITS) {
            let idx = reader.peek_bits(FAST_BITS, BitOrder::LsbFirst)? as usize;
            let (symbol, len) = self.fast[idx];
            if len > 0 {
                reader.skip_bits(len)?;
                return Ok(symbol);
            }
        }

        self.decode_probing(reader)
    }

    /// Fallback: probe codewords in canonical order against the reader.
    /// Handles codewords longer than `FAST_BITS` and the tail of the
    /// stream, where fewer than 8 bits remain to peek.
    fn decode_probing<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        for cw in &self.probe_order {
            if reader.starts_with(u32::from(cw.code), cw.len)? {
                reader.skip_bits(cw.len)?;
                return Ok(cw.symbol);
            }
        }

        if reader.has_bits(self.max_len) {
            Err(Error::symbol_decode(reader.bit_position()))
        } else {
            Err(Error::end_of_stream(reader.bit_position()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferroflate_core::bitstream::BitWriter;
    use std::io::Cursor;

    /// RFC 1951 §3.2.2 worked example: lengths (3, 3, 3, 3, 3, 2, 4, 4)
    /// yield codes 010, 011, 100, 101, 110, 00, 1110, 1111.
    #[test]
    fn test_rfc_worked_example() {
        let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
        let table = HuffmanTable::from_code_lengths(&lengths);

        assert_eq!(table.code_of(0), Some((0b010, 3)));
        assert_eq!(table.code_of(1), Some((0b011, 3)));
        assert_eq!(table.code_of(2), Some((0b100, 3)));
        assert_eq!(table.code_of(3), Some((0b101, 3)));
        assert_eq!(table.code_of(4), Some((0b110, 3)));
        assert_eq!(table.code_of(5), Some((0b00, 2)));
        assert_eq!(table.code_of(6), Some((0b1110, 4)));
        assert_eq!(table.code_of(7), Some((0b1111, 4)));
    }

    #[test]
    fn test_prefix_code_invariants() {
        let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
        let table = HuffmanTable::from_code_lengths(&lengths);
        let codewords = table.codewords();

        // No codeword is a prefix of another, and no two are equal.
        for (i, a) in codewords.iter().enumerate() {
            for b in codewords.iter().skip(i + 1) {
                let (short, long) = if a.len <= b.len { (a, b) } else { (b, a) };
                let prefix = long.code >> (long.len - short.len);
                assert_ne!(
                    prefix, short.code,
                    "{:?} is a prefix of {:?}",
                    short, long
                );
            }
        }

        // Within a length, codes ascend in symbol order; across lengths,
        // each first code extends past the previous length's last code.
        for pair in codewords.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.len == b.len {
                assert!(a.code < b.code);
                assert!(a.symbol < b.symbol);
            } else {
                assert!(a.len < b.len);
                assert!(u32::from(b.code) >= (u32::from(a.code) + 1) << (b.len - a.len));
            }
        }
    }

    #[test]
    fn test_decode_sequence() {
        // A=1 bit, B/C=2 bits: A=0, B=10, C=11.
        let lengths = [1u8, 2, 2];
        let table = HuffmanTable::from_code_lengths(&lengths);

        let mut data = Vec::new();
        {
            let mut writer = BitWriter::new(&mut data);
            for &(code, len) in &[(0u32, 1u8), (0b10, 2), (0b11, 2), (0, 1)] {
                writer.write_bits(code, len, BitOrder::MsbFirst).unwrap();
            }
            writer.flush().unwrap();
        }

        let mut reader = BitReader::new(Cursor::new(data));
        assert_eq!(table.decode(&mut reader).unwrap(), 0);
        assert_eq!(table.decode(&mut reader).unwrap(), 1);
        assert_eq!(table.decode(&mut reader).unwrap(), 2);
        assert_eq!(table.decode(&mut reader).unwrap(), 0);
    }

    #[test]
    fn test_decode_long_codeword() {
        // Lengths 1,2,...,8,9,9 form a complete code whose two longest
        // codewords exceed the fast-lookup width.
        let lengths = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 9];
        let table = HuffmanTable::from_code_lengths(&lengths);

        let (code8, len8) = table.code_of(8).unwrap();
        let (code9, len9) = table.code_of(9).unwrap();
        assert_eq!((len8, len9), (9, 9));

        let mut data = Vec::new();
        {
            let mut writer = BitWriter::new(&mut data);
            writer
                .write_bits(u32::from(code9), len9, BitOrder::MsbFirst)
                .unwrap();
            writer
                .write_bits(u32::from(code8), len8, BitOrder::MsbFirst)
                .unwrap();
            writer.flush().unwrap();
        }

        let mut reader = BitReader::new(Cursor::new(data));
        assert_eq!(table.decode(&mut reader).unwrap(), 9);
        assert_eq!(table.decode(&mut reader).unwrap(), 8);
    }

    #[test]
    fn test_decode_at_stream_tail() {
        // A 2-bit codeword sitting in the last partial byte still decodes
        // even though 8 bits cannot be peeked.
        let lengths = [1u8, 2, 2];
        let table = HuffmanTable::from_code_lengths(&lengths);

        let data = vec![0b0100_0000u8]; // final two bits: 1,0 -> code 10 -> symbol 1
        let mut reader = BitReader::new(Cursor::new(data));
        reader.skip_bits(6).unwrap();
        assert_eq!(table.decode(&mut reader).unwrap(), 1);
    }

    #[test]
    fn test_empty_table_fails() {
        let table = HuffmanTable::from_code_lengths(&[0u8, 0, 0, 0]);
        assert_eq!(table.max_code_length(), 0);

        let mut reader = BitReader::new(Cursor::new(vec![0u8]));
        assert!(matches!(
            table.decode(&mut reader),
            Err(Error::SymbolDecode { .. })
        ));
    }

    #[test]
    fn test_single_symbol() {
        let lengths = [0u8, 1, 0];
        let table = HuffmanTable::from_code_lengths(&lengths);

        let mut reader = BitReader::new(Cursor::new(vec![0u8]));
        assert_eq!(table.decode(&mut reader).unwrap(), 1);
    }

    #[test]
    fn test_incomplete_code_gap_is_symbol_error() {
        // Lengths {2, 2}: codes 00 and 01; the stream starts with 1, which
        // matches nothing.
        let lengths = [2u8, 2];
        let table = HuffmanTable::from_code_lengths(&lengths);

        let mut reader = BitReader::new(Cursor::new(vec![0xFFu8, 0xFF]));
        assert!(matches!(
            table.decode(&mut reader),
            Err(Error::SymbolDecode { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "exceeds maximum")]
    fn test_overlong_length_panics() {
        let _ = HuffmanTable::from_code_lengths(&[16u8]);
    }
}
