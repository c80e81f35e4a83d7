//! Spectral analysis configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Windowed FFT settings for the offline clip analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Hann window / FFT size in samples (must be power of 2)
    pub window_size: usize,

    /// Advance between consecutive windows (samples)
    /// 1024 with a 2048 window = 50% overlap
    pub hop_size: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            window_size: 2048,
            hop_size: 1024,
        }
    }
}

impl AnalysisParams {
    /// Center frequency of an FFT bin (Hz)
    pub fn bin_to_hz(&self, bin: usize, sample_rate_hz: f32) -> f32 {
        bin as f32 * sample_rate_hz / self.window_size as f32
    }

    /// Number of analysis frames produced for a signal of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        len.saturating_sub(self.window_size) / self.hop_size
    }

    /// Validate configuration (window size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.window_size.is_power_of_two() {
            return Err(ConfigError::invalid(
                "window_size",
                format!("must be power of 2, got {}", self.window_size),
            ));
        }
        if self.hop_size == 0 || self.hop_size > self.window_size {
            return Err(ConfigError::invalid(
                "hop_size",
                format!("must be in 1..={}, got {}", self.window_size, self.hop_size),
            ));
        }
        Ok(())
    }
}
