use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::info;

use crate::command::RateMode;
use crate::constants::{AUDIT_WARMUP, AUDIT_WINDOW, FRAME_SIZE};
use crate::error::Error;
use crate::session::Session;
use crate::transport::ByteStreamPort;

/// Parameters for a throughput audit run.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Wall-clock measurement window per rate
    pub window: Duration,
    /// Stream warm-up discarded before counting starts
    pub warmup: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            window: AUDIT_WINDOW,
            warmup: AUDIT_WARMUP,
        }
    }
}

/// Outcome of auditing one rate mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateReport {
    pub mode: RateMode,
    pub target_hz: f64,
    pub actual_hz: f64,
    /// Whole frames implied by the byte count
    pub samples: u64,
    pub bytes: u64,
    pub elapsed_secs: f64,
    pub error_percent: f64,
}

impl fmt::Display for RateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: target {:.0} Hz, actual {:.1} Hz, {} samples in {:.2} s, error {:.2}%",
            self.mode, self.target_hz, self.actual_hz, self.samples, self.elapsed_secs, self.error_percent
        )
    }
}

/// Measure the effective sample rate for one mode.
///
/// The sequence is the bench discipline: force the device to a known
/// state, select the rate, start, let the stream warm up and throw the
/// warm-up away, then count raw bytes for the whole window and divide by
/// the elapsed wall clock. Counting bytes instead of decoded frames keeps
/// the throughput figure independent of framing correctness; the two are
/// audited separately on purpose.
pub async fn audit_rate<P: ByteStreamPort>(
    session: &mut Session<P>,
    mode: RateMode,
    config: &AuditConfig,
) -> Result<RateReport, Error> {
    info!(%mode, window = ?config.window, "Auditing throughput");

    // The device may still be streaming from an earlier run.
    session.stop().await?;
    session.drain().await?;

    session.select_rate(mode).await?;
    session.start().await?;

    sleep(config.warmup).await;
    session.discard_input()?;

    let (bytes, elapsed) = session.count_raw_bytes(config.window).await?;
    session.stop().await?;

    let elapsed_secs = elapsed.as_secs_f64();
    let samples = bytes / FRAME_SIZE as u64;
    let target_hz = mode.as_hz() as f64;
    let actual_hz = samples as f64 / elapsed_secs;
    let error_percent = (target_hz - actual_hz).abs() / target_hz * 100.0;

    let report = RateReport {
        mode,
        target_hz,
        actual_hz,
        samples,
        bytes,
        elapsed_secs,
        error_percent,
    };
    info!(%report, "Throughput audit finished");
    Ok(report)
}

/// Audit every rate mode, slowest first.
pub async fn audit_all<P: ByteStreamPort>(
    session: &mut Session<P>,
    config: &AuditConfig,
) -> Result<Vec<RateReport>, Error> {
    let mut reports = Vec::with_capacity(RateMode::ALL.len());
    for mode in RateMode::ALL {
        reports.push(audit_rate(session, mode, config).await?);
    }
    Ok(reports)
}
