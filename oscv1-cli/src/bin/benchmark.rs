use clap::Parser;
use oscv1_lib::audit::{AuditConfig, audit_all, audit_rate};
use oscv1_lib::{RateMode, Session, SessionConfig};
use std::error::Error;
use std::time::Duration;

/// Throughput benchmark for the OSC_V1 digitizer: measures the effective
/// sample rate per mode and reports the deviation from target.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Serial port (auto-detected when omitted)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = oscv1_lib::constants::BAUD_RATE)]
    baud: u32,

    /// Measurement window per rate, in seconds
    #[arg(short, long, default_value = "10")]
    duration: u64,

    /// Warm-up discarded before each window, in milliseconds
    #[arg(long, default_value = "200")]
    warmup_ms: u64,

    /// Benchmark a single rate in kHz; all three when omitted
    #[arg(short, long, value_parser = ["1", "10", "20"])]
    rate: Option<String>,

    /// Emit the reports as JSON instead of a table
    #[arg(long)]
    json: bool,

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

    let session_config = SessionConfig {
        baud: args.baud,
        ..SessionConfig::default()
    };
    let audit_config = AuditConfig {
        window: Duration::from_secs(args.duration),
        warmup: Duration::from_millis(args.warmup_ms),
    };

    eprintln!("Connecting to OSC_V1 digitizer...");
    let mut session = match &args.port {
        Some(port) => Session::open(port, session_config).await?,
        None => Session::discover(session_config).await?,
    };

    let reports = match &args.rate {
        Some(rate) => {
            let mode = match rate.as_str() {
                "1" => RateMode::Khz1,
                "10" => RateMode::Khz10,
                "20" => RateMode::Khz20,
                _ => unreachable!(),
            };
            eprintln!("Measuring {mode} over a {}s window...", args.duration);
            vec![audit_rate(&mut session, mode, &audit_config).await?]
        }
        None => {
            eprintln!("Measuring all rates, {}s window each...", args.duration);
            audit_all(&mut session, &audit_config).await?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("{}", "=".repeat(62));
    println!(
        "{:<10} {:>12} {:>12} {:>10} {:>12}",
        "Mode", "Target (Hz)", "Actual (Hz)", "Samples", "Error (%)"
    );
    println!("{}", "=".repeat(62));
    for report in &reports {
        println!(
            "{:<10} {:>12.0} {:>12.1} {:>10} {:>12.2}",
            report.mode.to_string(),
            report.target_hz,
            report.actual_hz,
            report.samples,
            report.error_percent
        );
    }
    println!("{}", "=".repeat(62));

    Ok(())
}
