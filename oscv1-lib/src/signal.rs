use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::Sample;

/// Basic statistics over one acquired block, in volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub min_v: f64,
    pub max_v: f64,
    /// DC offset of the block
    pub mean_v: f64,
    pub rms_v: f64,
    pub peak_to_peak_v: f64,
    pub count: usize,
}

impl SignalStats {
    /// Compute over a block of samples; `None` for an empty block.
    pub fn from_samples(samples: &[Sample]) -> Option<SignalStats> {
        if samples.is_empty() {
            return None;
        }

        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for sample in samples {
            let v = sample.volts();
            min_v = min_v.min(v);
            max_v = max_v.max(v);
            sum += v;
            sum_sq += v * v;
        }

        let n = samples.len() as f64;
        Some(SignalStats {
            min_v,
            max_v,
            mean_v: sum / n,
            rms_v: (sum_sq / n).sqrt(),
            peak_to_peak_v: max_v - min_v,
            count: samples.len(),
        })
    }
}

impl fmt::Display for SignalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min: {:.3} V, max: {:.3} V, mean: {:.3} V, RMS: {:.3} V, p-p: {:.3} V ({} samples)",
            self.min_v, self.max_v, self.mean_v, self.rms_v, self.peak_to_peak_v, self.count
        )
    }
}
