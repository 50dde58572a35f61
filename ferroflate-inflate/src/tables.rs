//! Constant tables from RFC 1951.
//!
//! Length and distance codes carry a base value plus a run of extra bits;
//! the fixed Huffman code lengths and the dynamic-header permutation order
//! are likewise spelled out by the RFC. All of these are process-lifetime
//! constants; the two fixed decoding tables are built once and cached.

use crate::huffman::HuffmanTable;
use std::sync::OnceLock;

/// Base match lengths for literal/length symbols 257-285 (RFC 1951 §3.2.5).
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits
];

/// Extra-bit counts for literal/length symbols 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Base distances for distance symbols 0-29 (RFC 1951 §3.2.5).
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Extra-bit counts for distance symbols 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, // 0-3
    1, 1, // 4-5
    2, 2, // 6-7
    3, 3, // 8-9
    4, 4, // 10-11
    5, 5, // 12-13
    6, 6, // 14-15
    7, 7, // 16-17
    8, 8, // 18-19
    9, 9, // 20-21
    10, 10, // 22-23
    11, 11, // 24-25
    12, 12, // 26-27
    13, 13, // 28-29
];

/// Transmission order of code-length-code lengths in a dynamic block
/// header (RFC 1951 §3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Fixed literal/length code lengths (RFC 1951 §3.2.6): 144 symbols of
/// length 8, 112 of length 9, 24 of length 7, 8 of length 8.
pub fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [8u8; 288];
    for len in lengths.iter_mut().take(256).skip(144) {
        *len = 9;
    }
    for len in lengths.iter_mut().take(280).skip(256) {
        *len = 7;
    }
    lengths
}

/// Fixed distance code lengths: all 32 symbols use 5 bits.
pub fn fixed_distance_lengths() -> [u8; 32] {
    [5u8; 32]
}

/// The fixed literal/length table, built once and cached.
pub fn fixed_litlen_table() -> &'static HuffmanTable {
    static TABLE: OnceLock<HuffmanTable> = OnceLock::new();
    TABLE.get_or_init(|| HuffmanTable::from_code_lengths(&fixed_litlen_lengths()))
}

/// The fixed distance table, built once and cached.
pub fn fixed_distance_table() -> &'static HuffmanTable {
    static TABLE: OnceLock<HuffmanTable> = OnceLock::new();
    TABLE.get_or_init(|| HuffmanTable::from_code_lengths(&fixed_distance_lengths()))
}

/// Decode a match length from a length symbol and its extra-bit value.
pub fn decode_length(symbol: u16, extra: u16) -> u16 {
    debug_assert!(
        (257..=285).contains(&symbol),
        "invalid length symbol: {}",
        symbol
    );
    LENGTH_BASE[(symbol - 257) as usize] + extra
}

/// Decode a distance from a distance symbol and its extra-bit value.
pub fn decode_distance(symbol: u16, extra: u16) -> u16 {
    debug_assert!(symbol < 30, "invalid distance symbol: {}", symbol);
    DISTANCE_BASE[symbol as usize] + extra
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_litlen_lengths() {
        let lengths = fixed_litlen_lengths();

        assert_eq!(lengths[0], 8);
        assert_eq!(lengths[143], 8);
        assert_eq!(lengths[144], 9);
        assert_eq!(lengths[255], 9);
        assert_eq!(lengths[256], 7); // end of block
        assert_eq!(lengths[279], 7);
        assert_eq!(lengths[280], 8);
        assert_eq!(lengths[287], 8);
    }

    #[test]
    fn test_fixed_distance_lengths() {
        assert!(fixed_distance_lengths().iter().all(|&l| l == 5));
    }

    #[test]
    fn test_length_table_values() {
        // Spot checks against RFC 1951 §3.2.5.
        assert_eq!((LENGTH_EXTRA_BITS[0], LENGTH_BASE[0]), (0, 3)); // 257
        assert_eq!((LENGTH_EXTRA_BITS[1], LENGTH_BASE[1]), (0, 4)); // 258
        assert_eq!((LENGTH_EXTRA_BITS[15], LENGTH_BASE[15]), (2, 31)); // 272
        assert_eq!((LENGTH_EXTRA_BITS[16], LENGTH_BASE[16]), (3, 35)); // 273
        assert_eq!((LENGTH_EXTRA_BITS[28], LENGTH_BASE[28]), (0, 258)); // 285

        // The largest reachable length is exactly 258.
        let max = LENGTH_BASE
            .iter()
            .zip(LENGTH_EXTRA_BITS.iter())
            .map(|(&base, &extra)| base + (1u16 << extra) - 1)
            .max()
            .unwrap();
        assert_eq!(max, 258);
    }

    #[test]
    fn test_distance_table_values() {
        assert_eq!((DISTANCE_EXTRA_BITS[0], DISTANCE_BASE[0]), (0, 1));
        assert_eq!((DISTANCE_EXTRA_BITS[15], DISTANCE_BASE[15]), (6, 193));
        assert_eq!((DISTANCE_EXTRA_BITS[16], DISTANCE_BASE[16]), (7, 257));
        assert_eq!((DISTANCE_EXTRA_BITS[18], DISTANCE_BASE[18]), (8, 513));

        // The largest reachable distance is exactly the window size.
        let max = DISTANCE_BASE
            .iter()
            .zip(DISTANCE_EXTRA_BITS.iter())
            .map(|(&base, &extra)| u32::from(base) + (1u32 << extra) - 1)
            .max()
            .unwrap();
        assert_eq!(max, 32768);
    }

    #[test]
    fn test_decode_helpers() {
        assert_eq!(decode_length(257, 0), 3);
        assert_eq!(decode_length(265, 1), 12);
        assert_eq!(decode_length(285, 0), 258);

        assert_eq!(decode_distance(0, 0), 1);
        assert_eq!(decode_distance(4, 1), 6);
        assert_eq!(decode_distance(29, 8191), 32768);
    }

    #[test]
    fn test_fixed_tables_build() {
        let litlen = fixed_litlen_table();
        let dist = fixed_distance_table();

        // Canonical fixed codes: symbol 0 is 00110000, symbol 256 is 0000000.
        assert_eq!(litlen.code_of(0), Some((0b0011_0000, 8)));
        assert_eq!(litlen.code_of(256), Some((0, 7)));
        assert_eq!(litlen.code_of(255), Some((0b1_1111_1111, 9)));
        assert_eq!(dist.code_of(0), Some((0, 5)));
        assert_eq!(dist.code_of(31), Some((31, 5)));
    }
}
