//! DEFLATE block decoding.
//!
//! A DEFLATE stream is a sequence of blocks, each opened by a 3-bit header
//! (BFINAL, BTYPE) and encoded as raw bytes (stored), with the predefined
//! Huffman tables (fixed), or with tables described inline (dynamic). The
//! decoder here is a resumable state machine: each call to
//! [`BlockDecoder::next_chunk`] runs until it can hand back a bounded chunk
//! of output, so the caller pulls decompressed data without the decoder
//! ever materializing the whole payload.

use crate::huffman::{END_OF_BLOCK, HuffmanTable};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
    fixed_distance_table, fixed_litlen_table,
};
use crate::trace::{BlockKind, BlockRecord};
use ferroflate_core::bitstream::{BitOrder, BitReader};
use ferroflate_core::error::{Error, Result};
use ferroflate_core::window::HistoryWindow;
use std::io::Read;

/// Output is flushed to the caller every time this many bytes accumulate,
/// plus a final partial flush at each block boundary.
pub const FLUSH_LIMIT: usize = 1024;

/// An LZ77 copy interrupted by a chunk flush.
#[derive(Debug, Clone, Copy)]
struct PendingCopy {
    distance: usize,
    remaining: usize,
}

#[derive(Debug)]
enum BlockState {
    /// Between blocks; the next bits are a block header.
    AwaitingHeader,
    /// Inside a stored block body with `remaining` raw bytes to copy.
    Stored { remaining: usize },
    /// Inside a fixed or dynamic block body.
    Compressed {
        litlen: HuffmanTable,
        dist: HuffmanTable,
        pending: Option<PendingCopy>,
    },
    /// A block with BFINAL set has completed.
    Done,
}

/// The block-decoding state machine.
///
/// Owns no I/O: the caller passes the same [`BitReader`] and
/// [`HistoryWindow`] to every call for the lifetime of one decode session.
#[derive(Debug)]
pub struct BlockDecoder {
    state: BlockState,
    final_block: bool,
    /// Bytes appended to the window since the last flush.
    unflushed: usize,
    /// Completed block records, drained by the stream driver.
    records: Vec<BlockRecord>,
    current: Option<BlockRecord>,
}

impl BlockDecoder {
    /// Create a decoder positioned before the first block header.
    pub fn new() -> Self {
        Self {
            state: BlockState::AwaitingHeader,
            final_block: false,
            unflushed: 0,
            records: Vec::new(),
            current: None,
        }
    }

    /// True once a block with BFINAL set has fully decoded.
    pub fn is_done(&self) -> bool {
        matches!(self.state, BlockState::Done)
    }

    /// Drain the records of all blocks completed so far.
    pub fn take_records(&mut self) -> Vec<BlockRecord> {
        std::mem::take(&mut self.records)
    }

    /// Decode until the next output chunk is ready.
    ///
    /// Returns `Ok(None)` once the final block has completed and all output
    /// has been handed out. Chunks are at most [`FLUSH_LIMIT`] bytes.
    pub fn next_chunk<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        window: &mut HistoryWindow,
    ) -> Result<Option<Vec<u8>>> {
        loop {
            match self.state {
                BlockState::Done => return Ok(None),
                BlockState::AwaitingHeader => self.read_header(reader, window)?,
                BlockState::Stored { .. } => {
                    if let Some(chunk) = self.run_stored(reader, window)? {
                        return Ok(Some(chunk));
                    }
                }
                BlockState::Compressed { .. } => {
                    if let Some(chunk) = self.run_compressed(reader, window)? {
                        return Ok(Some(chunk));
                    }
                }
            }
        }
    }

    /// Read a block header and set up the body state.
    fn read_header<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        window: &HistoryWindow,
    ) -> Result<()> {
        let start = reader.bit_position();
        let bfinal = reader.read_bits(1, BitOrder::LsbFirst)? == 1;
        let btype = reader.read_bits(2, BitOrder::LsbFirst)?;
        self.final_block = bfinal;

        let index = self.records.len();
        let output_start = window.produced() as u64 * 8;

        let record = match btype {
            0b00 => {
                // Stored blocks restart at the next byte boundary.
                reader.align_to_byte();
                let len = reader.read_bits(16, BitOrder::LsbFirst)? as u16;
                let nlen = reader.read_bits(16, BitOrder::LsbFirst)? as u16;
                if u32::from(len) + u32::from(nlen) != 0xFFFF {
                    return Err(Error::uncompressed_length_mismatch(
                        len,
                        nlen,
                        reader.bit_position(),
                    ));
                }
                self.state = BlockState::Stored {
                    remaining: len as usize,
                };
                BlockRecord {
                    index,
                    kind: BlockKind::Stored,
                    start_offset: start,
                    codes_start_offset: reader.bit_position(),
                    data_start_offset: reader.bit_position(),
                    data_stop_offset: 0,
                    output_start_offset: output_start,
                    output_stop_offset: 0,
                }
            }
            0b01 => {
                self.state = BlockState::Compressed {
                    litlen: fixed_litlen_table().clone(),
                    dist: fixed_distance_table().clone(),
                    pending: None,
                };
                BlockRecord {
                    index,
                    kind: BlockKind::Fixed,
                    start_offset: start,
                    codes_start_offset: reader.bit_position(),
                    data_start_offset: reader.bit_position(),
                    data_stop_offset: 0,
                    output_start_offset: output_start,
                    output_stop_offset: 0,
                }
            }
            0b10 => {
                let codes_start = reader.bit_position();
                let (litlen, dist) = read_dynamic_tables(reader)?;
                let data_start = reader.bit_position();
                self.state = BlockState::Compressed {
                    litlen,
                    dist,
                    pending: None,
                };
                BlockRecord {
                    index,
                    kind: BlockKind::Dynamic,
                    start_offset: start,
                    codes_start_offset: codes_start,
                    data_start_offset: data_start,
                    data_stop_offset: 0,
                    output_start_offset: output_start,
                    output_stop_offset: 0,
                }
            }
            _ => return Err(Error::invalid_block_type(start + 1)),
        };

        self.current = Some(record);
        Ok(())
    }

    /// Copy stored-block bytes into the window, flushing at the limit.
    fn run_stored<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        window: &mut HistoryWindow,
    ) -> Result<Option<Vec<u8>>> {
        let BlockState::Stored { remaining: mut rem } = self.state else {
            unreachable!("run_stored outside a stored block");
        };

        while rem > 0 {
            if self.unflushed >= FLUSH_LIMIT {
                self.state = BlockState::Stored { remaining: rem };
                self.unflushed = 0;
                return Ok(Some(window.last_n(FLUSH_LIMIT)?));
            }

            let take = rem.min(FLUSH_LIMIT - self.unflushed);
            let mut buf = vec![0u8; take];
            reader.read_bytes(&mut buf)?;
            for &byte in &buf {
                window.append_literal(byte);
            }
            rem -= take;
            self.unflushed += take;
        }

        self.state = BlockState::Stored { remaining: 0 };
        self.end_block(reader, window)
    }

    /// Decode literal/length symbols until the next flush or end of block.
    fn run_compressed<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        window: &mut HistoryWindow,
    ) -> Result<Option<Vec<u8>>> {
        let mut block_done = false;
        let mut chunk: Option<Vec<u8>> = None;

        {
            let BlockState::Compressed {
                litlen,
                dist,
                pending,
            } = &mut self.state
            else {
                unreachable!("run_compressed outside a compressed block");
            };

            'decode: loop {
                // Service an interrupted copy before decoding further.
                if let Some(copy) = pending {
                    while copy.remaining > 0 {
                        if self.unflushed >= FLUSH_LIMIT {
                            chunk = Some(window.last_n(FLUSH_LIMIT)?);
                            self.unflushed = 0;
                            break 'decode;
                        }
                        window.append_from_back_reference(copy.distance)?;
                        copy.remaining -= 1;
                        self.unflushed += 1;
                    }
                    *pending = None;
                }

                if self.unflushed >= FLUSH_LIMIT {
                    chunk = Some(window.last_n(FLUSH_LIMIT)?);
                    self.unflushed = 0;
                    break 'decode;
                }

                let symbol = litlen.decode(reader)?;
                if symbol < END_OF_BLOCK {
                    window.append_literal(symbol as u8);
                    self.unflushed += 1;
                } else if symbol == END_OF_BLOCK {
                    block_done = true;
                    break 'decode;
                } else if symbol <= 285 {
                    let extra_bits = LENGTH_EXTRA_BITS[(symbol - 257) as usize];
                    let extra = reader.read_bits(extra_bits, BitOrder::LsbFirst)? as u16;
                    let length = decode_length(symbol, extra) as usize;

                    let dist_symbol = dist.decode(reader)?;
                    if dist_symbol >= 30 {
                        return Err(Error::symbol_decode(reader.bit_position()));
                    }
                    let extra_bits = DISTANCE_EXTRA_BITS[dist_symbol as usize];
                    let extra = reader.read_bits(extra_bits, BitOrder::LsbFirst)? as u16;
                    let distance = decode_distance(dist_symbol, extra) as usize;

                    if distance > window.produced() {
                        return Err(Error::invalid_back_reference(distance, window.produced()));
                    }
                    *pending = Some(PendingCopy {
                        distance,
                        remaining: length,
                    });
                } else {
                    return Err(Error::symbol_decode(reader.bit_position()));
                }
            }
        }

        if block_done {
            return self.end_block(reader, window);
        }
        Ok(chunk)
    }

    /// Close out the current block: final partial flush, record the stop
    /// offsets, and transition to the next header or the terminal state.
    fn end_block<R: Read>(
        &mut self,
        reader: &BitReader<R>,
        window: &HistoryWindow,
    ) -> Result<Option<Vec<u8>>> {
        if let Some(mut record) = self.current.take() {
            record.data_stop_offset = reader.bit_position();
            record.output_stop_offset = window.produced() as u64 * 8;
            self.records.push(record);
        }

        self.state = if self.final_block {
            BlockState::Done
        } else {
            BlockState::AwaitingHeader
        };

        if self.unflushed > 0 {
            let chunk = window.last_n(self.unflushed)?;
            self.unflushed = 0;
            return Ok(Some(chunk));
        }
        Ok(None)
    }
}

impl Default for BlockDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a dynamic block's code-length section and build both tables.
fn read_dynamic_tables<R: Read>(
    reader: &mut BitReader<R>,
) -> Result<(HuffmanTable, HuffmanTable)> {
    let hlit = reader.read_bits(5, BitOrder::LsbFirst)? as usize + 257;
    let hdist = reader.read_bits(5, BitOrder::LsbFirst)? as usize + 1;
    let hclen = reader.read_bits(4, BitOrder::LsbFirst)? as usize + 4;

    let mut cl_lengths = [0u8; 19];
    for &symbol in CODE_LENGTH_ORDER.iter().take(hclen) {
        cl_lengths[symbol] = reader.read_bits(3, BitOrder::LsbFirst)? as u8;
    }
    let cl_table = HuffmanTable::from_code_lengths(&cl_lengths);

    // RLE expansion of the literal/length and distance code lengths.
    // Repeats may run past the expected count; the mismatch is detected
    // after the loop rather than clamped mid-repeat.
    let expected = hlit + hdist;
    let mut lengths: Vec<u8> = Vec::with_capacity(expected);
    while lengths.len() < expected {
        let symbol = cl_table.decode(reader)?;
        match symbol {
            0..=15 => lengths.push(symbol as u8),
            16 => {
                let Some(&previous) = lengths.last() else {
                    return Err(Error::invalid_sequence_symbol(16, reader.bit_position()));
                };
                let repeat = reader.read_bits(2, BitOrder::LsbFirst)? as usize + 3;
                lengths.resize(lengths.len() + repeat, previous);
            }
            17 => {
                let repeat = reader.read_bits(3, BitOrder::LsbFirst)? as usize + 3;
                lengths.resize(lengths.len() + repeat, 0);
            }
            18 => {
                let repeat = reader.read_bits(7, BitOrder::LsbFirst)? as usize + 11;
                lengths.resize(lengths.len() + repeat, 0);
            }
            _ => return Err(Error::invalid_sequence_symbol(symbol, reader.bit_position())),
        }
    }
    if lengths.len() != expected {
        return Err(Error::invalid_code_length_count(expected, lengths.len()));
    }

    let litlen = HuffmanTable::from_code_lengths(&lengths[..hlit]);
    let dist = HuffmanTable::from_code_lengths(&lengths[hlit..]);
    Ok((litlen, dist))
}
