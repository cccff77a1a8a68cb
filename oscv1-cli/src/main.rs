use clap::Parser;
use oscv1_lib::{Session, SessionConfig, SignalStats};
use std::error::Error;
use std::time::Duration;

/// Connection check for the OSC_V1 digitizer: handshake, a short
/// acquisition preview and decode statistics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Serial port (auto-detected when omitted)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = oscv1_lib::constants::BAUD_RATE)]
    baud: u32,

    /// Samples to preview
    #[arg(short, long, default_value = "16")]
    samples: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let config = SessionConfig {
        baud: args.baud,
        ..SessionConfig::default()
    };

    println!("Connecting to OSC_V1 digitizer...");
    let mut session = match &args.port {
        Some(port) => Session::open(port, config).await?,
        None => Session::discover(config).await?,
    };

    let ident = session.handshake().await?;
    println!("Device identified: {ident}\n");

    // Short acquisition preview at the post-reset default rate.
    session.start().await?;
    let samples = session.read_samples(args.samples, Duration::from_millis(500)).await?;
    session.stop().await?;
    session.drain().await?;

    println!("Preview ({} samples at {}):", samples.len(), session.rate());
    for sample in &samples {
        println!("  raw {:>4}  ->  {:.3} V", sample.raw(), sample.volts());
    }
    if let Some(stats) = SignalStats::from_samples(&samples) {
        println!("\nSignal: {stats}");
    }

    let decode = session.decode_stats();
    println!("Decode: {} frames, {} sync errors", decode.valid_frames, decode.sync_errors);

    Ok(())
}
