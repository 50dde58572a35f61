//! # ferroflate Inflate
//!
//! Pure Rust decoding of DEFLATE (RFC 1951) and zlib-wrapped (RFC 1950)
//! streams.
//!
//! ## Features
//!
//! - All three DEFLATE block types: stored, fixed Huffman, dynamic Huffman
//! - Bounded-memory streaming: output is pulled as chunks of at most
//!   [`block::FLUSH_LIMIT`] bytes, never materialized whole
//! - zlib framing with the header mod-31 congruence check
//! - An optional line-oriented block-statistics trace
//!
//! ## Example
//!
//! ```rust
//! use ferroflate_inflate::inflate;
//!
//! // A stored block holding "Hello".
//! let compressed = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(decompressed, b"Hello");
//! ```
//!
//! Streaming consumption goes through [`StreamDecoder`], an iterator of
//! chunks:
//!
//! ```rust
//! use ferroflate_inflate::StreamDecoder;
//!
//! let compressed = [0x01u8, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];
//! let decoder = StreamDecoder::raw(&compressed[..]);
//! let mut output = Vec::new();
//! for chunk in decoder {
//!     output.extend_from_slice(&chunk.unwrap());
//! }
//! assert_eq!(output, b"Hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod huffman;
pub mod tables;
pub mod trace;
pub mod zlib;

// Re-exports
pub use block::BlockDecoder;
pub use ferroflate_core::error::{Error, Result};
pub use huffman::HuffmanTable;
pub use trace::{BlockKind, BlockRecord, StreamTrace};
pub use zlib::{StreamDecoder, StreamFormat, decode_to_writer, inflate, zlib_decompress};
