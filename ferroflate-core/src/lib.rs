//! # ferroflate Core
//!
//! Core components for the ferroflate zlib/DEFLATE decoder.
//!
//! This crate provides the infrastructure the codec layer is built on:
//!
//! - [`bitstream`]: bit-level reading and writing with the two DEFLATE
//!   bit-interpretation conventions made explicit ([`BitOrder`])
//! - [`window`]: the 32 KiB sliding history window addressed by LZ77
//!   back-references
//! - [`error`]: the decode error taxonomy
//!
//! ## Architecture
//!
//! ferroflate is a small layered stack:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ ferroflate-cli                               │
//! │     file/stdin -> file/stdout decoding       │
//! ├──────────────────────────────────────────────┤
//! │ ferroflate-inflate                           │
//! │     Huffman tables, block machine, zlib      │
//! ├──────────────────────────────────────────────┤
//! │ ferroflate-core (this crate)                 │
//! │     BitReader/BitWriter, HistoryWindow       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ferroflate_core::bitstream::{BitOrder, BitReader};
//! use std::io::Cursor;
//!
//! let data = vec![0xAB, 0xCD];
//! let mut reader = BitReader::new(Cursor::new(data));
//! let bits = reader.read_bits(12, BitOrder::LsbFirst).unwrap();
//! assert_eq!(bits, 0xDAB);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitOrder, BitReader, BitWriter};
pub use error::{Error, Result};
pub use window::{DEFLATE_WINDOW_SIZE, HistoryWindow};
