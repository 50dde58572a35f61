//! ferroflate CLI
//!
//! Decodes zlib or raw DEFLATE streams from a file or stdin to a file or
//! stdout, optionally reporting per-block statistics on stderr.

use clap::{Parser, Subcommand};
use ferroflate_core::error::Result;
use ferroflate_inflate::{StreamFormat, StreamTrace, decode_to_writer};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "ferroflate")]
#[command(author, version, about = "Pure Rust zlib/DEFLATE stream decoder")]
#[command(long_about = "
ferroflate decodes zlib-wrapped or raw DEFLATE streams.

Examples:
  ferroflate decode object.z -o object.bin
  ferroflate decode --raw data.deflate
  git cat-file blob HEAD:README | ferroflate decode --trace > /dev/null
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a compressed stream
    #[command(alias = "d")]
    Decode {
        /// Input file (stdin if omitted)
        input: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat the input as a raw DEFLATE stream without a zlib header
        #[arg(long)]
        raw: bool,

        /// Print block statistics to stderr
        #[arg(long)]
        trace: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            raw,
            trace,
        } => decode(input, output, raw, trace),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn decode(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    raw: bool,
    trace: bool,
) -> Result<u64> {
    let format = if raw {
        StreamFormat::Raw
    } else {
        StreamFormat::Zlib
    };

    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let mut stats = trace.then(|| StreamTrace::new(io::stderr().lock()));
    let total = decode_to_writer(reader, &mut writer, format, stats.as_mut())?;
    writer.flush()?;
    Ok(total)
}
