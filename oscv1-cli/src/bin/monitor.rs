use clap::Parser;
use oscv1_lib::{RateMode, Session, SessionConfig, SignalStats};
use std::error::Error;
use std::time::{Duration, Instant};

/// Live sample monitor for the OSC_V1 digitizer: streams decoded values
/// at a chosen rate and prints signal statistics at the end.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Serial port (auto-detected when omitted)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = oscv1_lib::constants::BAUD_RATE)]
    baud: u32,

    /// Sample rate in kHz
    #[arg(short, long, default_value = "1", value_parser = ["1", "10", "20"])]
    rate: String,

    /// Duration in seconds
    #[arg(short, long, default_value = "5")]
    duration: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let mode = match args.rate.as_str() {
        "1" => RateMode::Khz1,
        "10" => RateMode::Khz10,
        "20" => RateMode::Khz20,
        _ => unreachable!(),
    };
    // One printed line per ~100 ms of stream, whatever the rate.
    let print_interval = (mode.as_hz() / 10) as usize;

    let config = SessionConfig {
        baud: args.baud,
        ..SessionConfig::default()
    };

    eprintln!("Connecting to OSC_V1 digitizer...");
    let mut session = match &args.port {
        Some(port) => Session::open(port, config).await?,
        None => Session::discover(config).await?,
    };

    session.select_rate(mode).await?;
    session.start().await?;
    println!("Streaming at {mode} for {}s...", args.duration);
    println!("{:>9} {:>6} {:>9}", "n", "raw", "volts");

    let started = Instant::now();
    let mut collected: Vec<oscv1_lib::Sample> = Vec::new();
    while started.elapsed() < Duration::from_secs(args.duration) {
        let batch = session.read_samples(512, Duration::from_millis(100)).await?;
        for sample in batch {
            if collected.len() % print_interval == 0 {
                println!("{:>9} {:>6} {:>8.3} V", collected.len(), sample.raw(), sample.volts());
            }
            collected.push(sample);
        }
    }

    session.stop().await?;
    session.drain().await?;

    let elapsed = started.elapsed().as_secs_f64();
    let decode = session.decode_stats();
    println!("\nStatistics:");
    println!("  Duration: {elapsed:.1}s");
    println!("  Samples decoded: {}", decode.valid_frames);
    println!("  Sync errors: {}", decode.sync_errors);
    println!("  Effective rate: {:.1} Hz", decode.valid_frames as f64 / elapsed);
    if let Some(stats) = SignalStats::from_samples(&collected) {
        println!("  Signal: {stats}");
    }

    Ok(())
}
