//! Stream-level decoding: the zlib wrapper and the chunk iterator.
//!
//! A zlib stream (RFC 1950) is a 2-byte header, raw DEFLATE data, and an
//! Adler-32 trailer. The header bytes, read big-endian as `CMF * 256 + FLG`,
//! must be a multiple of 31; that congruence is the only framing check
//! performed here. The Adler-32 trailer is not verified: trailer bytes may
//! be pulled into the bit reader's buffer but are never inspected.

use crate::block::BlockDecoder;
use crate::trace::{BlockRecord, StreamTrace};
use ferroflate_core::bitstream::{BitOrder, BitReader};
use ferroflate_core::error::{Error, Result};
use ferroflate_core::window::HistoryWindow;
use std::io::{Read, Write};

/// Framing of the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    /// 2-byte zlib header (mod-31 checked), then DEFLATE data.
    Zlib,
    /// Raw DEFLATE data with no wrapper.
    Raw,
}

/// A pull-based decoder over one compressed stream.
///
/// The decoder owns its reader and window for the whole session and yields
/// decompressed data as a lazy, finite, single-pass sequence of chunks; it
/// implements `Iterator` over `Result<Vec<u8>>`. After an error the
/// iterator is fused and yields nothing further. Chunks handed out before
/// a failure remain with the caller.
#[derive(Debug)]
pub struct StreamDecoder<R: Read> {
    reader: BitReader<R>,
    window: HistoryWindow,
    blocks: BlockDecoder,
    format: StreamFormat,
    header_value: Option<u16>,
    started: bool,
    failed: bool,
}

impl<R: Read> StreamDecoder<R> {
    /// Create a decoder with the given framing.
    pub fn new(reader: R, format: StreamFormat) -> Self {
        Self {
            reader: BitReader::new(reader),
            window: HistoryWindow::deflate(),
            blocks: BlockDecoder::new(),
            format,
            header_value: None,
            started: false,
            failed: false,
        }
    }

    /// Create a decoder for a zlib-wrapped stream.
    pub fn zlib(reader: R) -> Self {
        Self::new(reader, StreamFormat::Zlib)
    }

    /// Create a decoder for a raw DEFLATE stream.
    pub fn raw(reader: R) -> Self {
        Self::new(reader, StreamFormat::Raw)
    }

    /// The zlib header value, once it has been read.
    pub fn header_value(&self) -> Option<u16> {
        self.header_value
    }

    /// Drain the records of all blocks decoded so far.
    pub fn take_block_records(&mut self) -> Vec<BlockRecord> {
        self.blocks.take_records()
    }

    /// Consume the decoder and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Decode until the next output chunk is ready.
    ///
    /// Returns `Ok(None)` when the final block has completed. Any error
    /// aborts the session; later calls keep returning `Ok(None)`.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.failed || self.blocks.is_done() {
            return Ok(None);
        }

        if !self.started {
            self.started = true;
            if self.format == StreamFormat::Zlib {
                if let Err(e) = self.check_header() {
                    self.failed = true;
                    return Err(e);
                }
            }
        }

        match self.blocks.next_chunk(&mut self.reader, &mut self.window) {
            Ok(chunk) => Ok(chunk),
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    /// Read the 2-byte zlib header and apply the mod-31 check.
    fn check_header(&mut self) -> Result<()> {
        let cmf = self.reader.read_bits(8, BitOrder::LsbFirst)? as u16;
        let flg = self.reader.read_bits(8, BitOrder::LsbFirst)? as u16;
        let value = cmf * 256 + flg;
        self.header_value = Some(value);
        if value % 31 != 0 {
            return Err(Error::invalid_zlib_header(value));
        }
        Ok(())
    }
}

impl<R: Read> Iterator for StreamDecoder<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Decompress a raw DEFLATE byte slice.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    collect_chunks(StreamDecoder::raw(data))
}

/// Decompress a zlib-wrapped byte slice.
pub fn zlib_decompress(data: &[u8]) -> Result<Vec<u8>> {
    collect_chunks(StreamDecoder::zlib(data))
}

fn collect_chunks<R: Read>(mut decoder: StreamDecoder<R>) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    while let Some(chunk) = decoder.next_chunk()? {
        output.extend_from_slice(&chunk);
    }
    Ok(output)
}

/// Decode a stream into a `Write` sink, optionally tracing block
/// statistics. Returns the number of decompressed bytes written.
pub fn decode_to_writer<R: Read, W: Write, T: Write>(
    input: R,
    output: &mut W,
    format: StreamFormat,
    mut trace: Option<&mut StreamTrace<T>>,
) -> Result<u64> {
    let mut decoder = StreamDecoder::new(input, format);

    let mut total = 0u64;
    let result = loop {
        match decoder.next_chunk() {
            Ok(Some(chunk)) => {
                output.write_all(&chunk)?;
                total += chunk.len() as u64;
            }
            Ok(None) => break Ok(total),
            Err(e) => break Err(e),
        }
    };

    // The trace reports whatever was observed, even for a failed stream.
    if let Some(trace) = trace.as_deref_mut() {
        if let Some(value) = decoder.header_value() {
            trace.header(value)?;
        }
        let records = decoder.take_block_records();
        for record in &records {
            trace.block(record)?;
        }
        trace.summary(&records)?;
    }

    result
}
