//! Decode a captured byte dump offline.
//!
//! Takes a hex dump of raw digitizer traffic (from a logic analyzer or a
//! straight `cat`-to-file of the serial port) and runs it through the
//! frame decoder, printing the recovered samples and what the resync
//! logic had to throw away.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

use oscv1_lib::frame::FrameDecoder;
use oscv1_lib::signal::SignalStats;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Hex string of captured bytes (whitespace and ':' separators allowed)
    #[arg(conflicts_with = "file")]
    hex: Option<String>,

    /// Read the hex dump from a file instead
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Samples to print before eliding the rest
    #[arg(short, long, default_value_t = 32)]
    limit: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dump = match (&cli.hex, &cli.file) {
        (Some(hex), _) => hex.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => return Err("provide a hex string or --file".into()),
    };
    let clean: String = dump.chars().filter(|c| !c.is_whitespace() && *c != ':').collect();
    let bytes = hex::decode(&clean)?;
    println!("{} raw bytes", bytes.len());

    let mut decoder = FrameDecoder::new();
    decoder.push_bytes(&bytes);
    let samples: Vec<_> = decoder.samples().collect();

    for (i, sample) in samples.iter().take(cli.limit).enumerate() {
        println!("{i:>6}  raw {:>4}  {:.3} V", sample.raw(), sample.volts());
    }
    if samples.len() > cli.limit {
        println!("  ... {} more", samples.len() - cli.limit);
    }

    let stats = decoder.stats();
    println!(
        "\n{} frames, {} sync errors, {} bytes left in the carry buffer",
        stats.valid_frames,
        stats.sync_errors,
        decoder.buffered()
    );
    if let Some(signal) = SignalStats::from_samples(&samples) {
        println!("{signal}");
    }
    Ok(())
}
