//! Diagnostic trace for decoded streams.
//!
//! The decoder records one [`BlockRecord`] per block: block type and the
//! bit offsets bracketing its header, code tables and body, on both the
//! compressed and the decompressed side. [`StreamTrace`] renders those
//! records as line-oriented text to any `Write` sink. The trace is purely
//! observational and never affects decode results.
//!
//! All sizes are denominated in bits, since block boundaries are not
//! byte-aligned.

use ferroflate_core::error::Result;
use std::fmt;
use std::io::Write;

/// The three DEFLATE block encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// BTYPE 0b00, raw bytes.
    Stored,
    /// BTYPE 0b01, predefined Huffman tables.
    Fixed,
    /// BTYPE 0b10, tables described in the block header.
    Dynamic,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Stored => write!(f, "stored"),
            BlockKind::Fixed => write!(f, "fixed"),
            BlockKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Offsets and sizes observed while decoding one block.
///
/// `start_offset` points at the BFINAL bit; `codes_start_offset` and
/// `data_start_offset` bracket the code-table section (empty for stored
/// and fixed blocks); `output_*` offsets are produced-byte counts times 8.
#[derive(Debug, Clone, Copy)]
pub struct BlockRecord {
    /// Index of the block within the stream, from 0.
    pub index: usize,
    /// Block encoding.
    pub kind: BlockKind,
    /// Bit offset of the block header.
    pub start_offset: u64,
    /// Bit offset where the code-table section begins.
    pub codes_start_offset: u64,
    /// Bit offset where the body begins.
    pub data_start_offset: u64,
    /// Bit offset just past the body.
    pub data_stop_offset: u64,
    /// Output bit offset when the body began.
    pub output_start_offset: u64,
    /// Output bit offset when the body ended.
    pub output_stop_offset: u64,
}

impl BlockRecord {
    /// Whole-block compressed size in bits.
    pub fn compressed_size(&self) -> u64 {
        self.data_stop_offset - self.start_offset
    }

    /// Code-table section size in bits.
    pub fn codes_size(&self) -> u64 {
        self.data_start_offset - self.codes_start_offset
    }

    /// Body size in bits.
    pub fn data_size(&self) -> u64 {
        self.data_stop_offset - self.data_start_offset
    }

    /// Header plus code-table overhead in bits.
    pub fn overhead_size(&self) -> u64 {
        self.data_start_offset - self.start_offset
    }

    /// Decompressed output attributable to this block, in bits.
    pub fn uncompressed_size(&self) -> u64 {
        self.output_stop_offset - self.output_start_offset
    }

    /// Output bits per compressed bit; `None` for a zero-size block.
    pub fn compress_ratio(&self) -> Option<f64> {
        let compressed = self.compressed_size();
        if compressed == 0 {
            return None;
        }
        Some(self.uncompressed_size() as f64 / compressed as f64)
    }
}

/// Line-oriented trace writer.
#[derive(Debug)]
pub struct StreamTrace<W: Write> {
    sink: W,
}

impl<W: Write> StreamTrace<W> {
    /// Create a trace writing to the given sink.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Consume the trace and return the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Report the zlib header value.
    pub fn header(&mut self, value: u16) -> Result<()> {
        writeln!(self.sink, "HEADER: zlib_header={:#06x}", value)?;
        Ok(())
    }

    /// Report one block's offsets and sizes.
    pub fn block(&mut self, record: &BlockRecord) -> Result<()> {
        let i = record.index;
        writeln!(self.sink, "BLOCK[{i}]: type={}", record.kind)?;
        writeln!(self.sink, "BLOCK[{i}]: start_offset={}", record.start_offset)?;
        writeln!(
            self.sink,
            "BLOCK[{i}]: codes_start_offset={}",
            record.codes_start_offset
        )?;
        writeln!(
            self.sink,
            "BLOCK[{i}]: data_start_offset={}",
            record.data_start_offset
        )?;
        writeln!(
            self.sink,
            "BLOCK[{i}]: data_stop_offset={}",
            record.data_stop_offset
        )?;
        writeln!(
            self.sink,
            "BLOCK[{i}]: output_start_offset={}",
            record.output_start_offset
        )?;
        writeln!(
            self.sink,
            "BLOCK[{i}]: output_stop_offset={}",
            record.output_stop_offset
        )?;
        self.size_line(&format!("block_{i:02}_size"), record.compressed_size())?;
        self.size_line(&format!("block_{i:02}_codes_size"), record.codes_size())?;
        self.size_line(&format!("block_{i:02}_data_size"), record.data_size())?;
        self.size_line(
            &format!("block_{i:02}_overhead_size"),
            record.overhead_size(),
        )?;
        self.size_line(
            &format!("block_{i:02}_uncompressed_size"),
            record.uncompressed_size(),
        )?;
        match record.compress_ratio() {
            Some(ratio) => writeln!(
                self.sink,
                "{:<35}= {}",
                format!("block_{i:02}_compress_ratio"),
                ratio
            )?,
            None => writeln!(
                self.sink,
                "{:<35}= inf",
                format!("block_{i:02}_compress_ratio")
            )?,
        }
        Ok(())
    }

    /// Report per-stream totals over all blocks.
    pub fn summary(&mut self, records: &[BlockRecord]) -> Result<()> {
        let count_of = |kind: BlockKind| records.iter().filter(|r| r.kind == kind).count();
        writeln!(
            self.sink,
            "{:<35}= {}",
            "stored blocks",
            count_of(BlockKind::Stored)
        )?;
        writeln!(
            self.sink,
            "{:<35}= {}",
            "fixed blocks",
            count_of(BlockKind::Fixed)
        )?;
        writeln!(
            self.sink,
            "{:<35}= {}",
            "dynamic blocks",
            count_of(BlockKind::Dynamic)
        )?;

        let compressed: u64 = records.iter().map(|r| r.compressed_size()).sum();
        let uncompressed: u64 = records.iter().map(|r| r.uncompressed_size()).sum();
        let overhead: u64 = records.iter().map(|r| r.overhead_size()).sum();
        self.size_line("total compressed size", compressed)?;
        self.size_line("total uncompressed size", uncompressed)?;
        self.size_line("total overhead size", overhead)?;
        if compressed > 0 {
            writeln!(
                self.sink,
                "{:<35}= {}",
                "total compress ratio",
                uncompressed as f64 / compressed as f64
            )?;
        }
        Ok(())
    }

    fn size_line(&mut self, label: &str, bits: u64) -> Result<()> {
        writeln!(
            self.sink,
            "{:<35}= {} b = {} B",
            label,
            bits,
            bits as f64 / 8.0
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> BlockRecord {
        BlockRecord {
            index: 0,
            kind: BlockKind::Fixed,
            start_offset: 16,
            codes_start_offset: 19,
            data_start_offset: 19,
            data_stop_offset: 122,
            output_start_offset: 0,
            output_stop_offset: 96,
        }
    }

    #[test]
    fn test_record_sizes() {
        let record = sample_record();
        assert_eq!(record.compressed_size(), 106);
        assert_eq!(record.codes_size(), 0);
        assert_eq!(record.overhead_size(), 3);
        assert_eq!(record.uncompressed_size(), 96);
        let ratio = record.compress_ratio().unwrap();
        assert!((ratio - 96.0 / 106.0).abs() < 1e-9);
    }

    #[test]
    fn test_trace_lines() {
        let mut trace = StreamTrace::new(Vec::new());
        trace.header(0x78DA).unwrap();
        let record = sample_record();
        trace.block(&record).unwrap();
        trace.summary(&[record]).unwrap();

        let text = String::from_utf8(trace.into_inner()).unwrap();
        assert!(text.contains("HEADER: zlib_header=0x78da"));
        assert!(text.contains("BLOCK[0]: type=fixed"));
        assert!(text.contains("total compressed size"));
        assert!(text.contains("= 106 b = 13.25 B"));
        assert!(text.contains("fixed blocks"));
    }
}
