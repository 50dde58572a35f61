//! Error types for ferroflate operations.
//!
//! Decode failures carry the bit offset at which they were detected where
//! one is meaningful, so a corrupt stream can be diagnosed against a hex
//! dump of the input.

use std::io;
use thiserror::Error;

/// The main error type for decode operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input source was exhausted before the requested bits were available.
    #[error("unexpected end of stream at bit offset {bit_offset}")]
    EndOfStream {
        /// Bit offset of the read that could not be satisfied.
        bit_offset: u64,
    },

    /// The 16-bit zlib header failed its mod-31 congruence check.
    #[error("invalid zlib header: {value:#06x} is not a multiple of 31")]
    InvalidZlibHeader {
        /// The header value (`CMF * 256 + FLG`).
        value: u16,
    },

    /// A block header carried the reserved block type 0b11.
    #[error("invalid block type 0b11 at bit offset {bit_offset}")]
    InvalidBlockType {
        /// Bit offset of the BTYPE field.
        bit_offset: u64,
    },

    /// A stored block's LEN/NLEN one's-complement check failed.
    #[error("stored block length check failed at bit offset {bit_offset}: LEN={len:#06x}, NLEN={nlen:#06x}")]
    UncompressedLengthMismatch {
        /// The LEN field.
        len: u16,
        /// The NLEN field.
        nlen: u16,
        /// Bit offset just past the NLEN field.
        bit_offset: u64,
    },

    /// A code-length sequence decode produced a symbol outside 0..=18,
    /// or a repeat-previous with no previous length.
    #[error("invalid code length sequence symbol {symbol} at bit offset {bit_offset}")]
    InvalidSequenceSymbol {
        /// The offending symbol.
        symbol: u16,
        /// Bit offset just past the symbol's codeword.
        bit_offset: u64,
    },

    /// The expanded code-length sequence does not have HLIT+HDIST entries.
    #[error("invalid number of literal/distance code lengths: expected {expected}, got {actual}")]
    InvalidCodeLengthCount {
        /// HLIT + HDIST.
        expected: usize,
        /// Number of lengths actually produced by the RLE expansion.
        actual: usize,
    },

    /// No Huffman codeword matches the upcoming bits.
    #[error("cannot decode symbol at bit offset {bit_offset}")]
    SymbolDecode {
        /// Bit offset at which decoding was attempted.
        bit_offset: u64,
    },

    /// A back-reference points further back than all bytes produced so far.
    #[error("invalid back-reference: distance {distance} exceeds {produced} bytes produced")]
    InvalidBackReference {
        /// The copy distance.
        distance: usize,
        /// Total bytes produced when the copy was attempted.
        produced: usize,
    },

    /// A window read was outside the addressable range.
    #[error("window range error: {message}")]
    WindowRange {
        /// Description of the violated bound.
        message: String,
    },
}

/// Result type alias for ferroflate operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an end-of-stream error.
    pub fn end_of_stream(bit_offset: u64) -> Self {
        Self::EndOfStream { bit_offset }
    }

    /// Create an invalid zlib header error.
    pub fn invalid_zlib_header(value: u16) -> Self {
        Self::InvalidZlibHeader { value }
    }

    /// Create an invalid block type error.
    pub fn invalid_block_type(bit_offset: u64) -> Self {
        Self::InvalidBlockType { bit_offset }
    }

    /// Create a stored-block length mismatch error.
    pub fn uncompressed_length_mismatch(len: u16, nlen: u16, bit_offset: u64) -> Self {
        Self::UncompressedLengthMismatch {
            len,
            nlen,
            bit_offset,
        }
    }

    /// Create an invalid sequence symbol error.
    pub fn invalid_sequence_symbol(symbol: u16, bit_offset: u64) -> Self {
        Self::InvalidSequenceSymbol { symbol, bit_offset }
    }

    /// Create an invalid code length count error.
    pub fn invalid_code_length_count(expected: usize, actual: usize) -> Self {
        Self::InvalidCodeLengthCount { expected, actual }
    }

    /// Create a symbol decode error.
    pub fn symbol_decode(bit_offset: u64) -> Self {
        Self::SymbolDecode { bit_offset }
    }

    /// Create an invalid back-reference error.
    pub fn invalid_back_reference(distance: usize, produced: usize) -> Self {
        Self::InvalidBackReference { distance, produced }
    }

    /// Create a window range error.
    pub fn window_range(message: impl Into<String>) -> Self {
        Self::WindowRange {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_zlib_header(0x62DA);
        assert!(err.to_string().contains("not a multiple of 31"));

        let err = Error::uncompressed_length_mismatch(0, 0, 40);
        assert!(err.to_string().contains("LEN=0x0000"));

        let err = Error::invalid_back_reference(2, 1);
        assert!(err.to_string().contains("distance 2 exceeds 1 bytes"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
