use serde::{Deserialize, Serialize};

/// Timings and counters of one [`Downsampler::run_all`](crate::Downsampler::run_all).
///
/// Diagnostic stage timings are `None` when the stage was skipped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DownsampleStats {
    pub subsample_ms: Option<f64>,
    pub gauss_reference_ms: Option<f64>,
    pub bilateral_ms: Option<f64>,
    pub final_ms: f64,
    /// Destination pixels whose residual weights could not be normalized and
    /// received the plain Gaussian average instead.
    pub fallback_pixels: usize,
}

impl DownsampleStats {
    pub fn total_ms(&self) -> f64 {
        self.subsample_ms.unwrap_or(0.0)
            + self.gauss_reference_ms.unwrap_or(0.0)
            + self.bilateral_ms.unwrap_or(0.0)
            + self.final_ms
    }
}
