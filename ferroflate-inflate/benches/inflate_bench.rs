//! Decode throughput benchmarks.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ferroflate_core::bitstream::{BitOrder, BitWriter};
use ferroflate_inflate::inflate;
use std::hint::black_box;

/// Wrap a payload in stored blocks (64 KiB input, several blocks).
fn stored_stream(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 64);
    let mut chunks = payload.chunks(65535).peekable();
    while let Some(chunk) = chunks.next() {
        let last = chunks.peek().is_none();
        out.push(if last { 0x01 } else { 0x00 });
        let len = chunk.len() as u16;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(chunk);
    }
    out
}

/// Encode a payload of bytes below 144 as one fixed-Huffman literal block.
fn fixed_literal_stream(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + payload.len() / 8);
    {
        let mut writer = BitWriter::new(&mut out);
        writer.write_bits(1, 1, BitOrder::LsbFirst).unwrap();
        writer.write_bits(0b01, 2, BitOrder::LsbFirst).unwrap();
        for &byte in payload {
            writer
                .write_bits(0x30 + u32::from(byte), 8, BitOrder::MsbFirst)
                .unwrap();
        }
        writer.write_bits(0, 7, BitOrder::MsbFirst).unwrap();
        writer.flush().unwrap();
    }
    out
}

fn bench_inflate(c: &mut Criterion) {
    let payload: Vec<u8> = (0..65536u32).map(|i| (i % 128) as u8).collect();

    let stored = stored_stream(&payload);
    let fixed = fixed_literal_stream(&payload);

    let mut group = c.benchmark_group("inflate");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("stored_64k", |b| {
        b.iter(|| inflate(black_box(&stored)).unwrap());
    });
    group.bench_function("fixed_literals_64k", |b| {
        b.iter(|| inflate(black_box(&fixed)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_inflate);
criterion_main!(benches);
