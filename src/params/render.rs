//! Real-time renderer and recording configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::simulation::check_smoothing;
use crate::error::ConfigError;

/// Real-time renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Length of the reflection delay line (seconds)
    pub max_delay_s: f32,

    /// Per-sample smoothing of band gains toward the latest targets, in (0, 1]
    pub band_gain_smoothing: f32,

    /// Per-sample smoothing of reflection delay/gain, in (0, 1]
    pub reflection_smoothing: f32,

    /// Band gain before the first room update arrives
    /// 1.0 = band-split passthrough
    pub initial_band_gain: f32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            max_delay_s: 1.0,
            band_gain_smoothing: 0.02,
            reflection_smoothing: 0.02,
            initial_band_gain: 1.0,
        }
    }
}

impl RenderParams {
    /// Delay line length in samples at the given output rate (at least 1)
    pub fn delay_line_len(&self, sample_rate_hz: f32) -> usize {
        ((self.max_delay_s * sample_rate_hz).floor() as usize).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_delay_s > 0.0) {
            return Err(ConfigError::invalid(
                "max_delay_s",
                format!("must be > 0, got {}", self.max_delay_s),
            ));
        }
        check_smoothing("band_gain_smoothing", self.band_gain_smoothing)?;
        check_smoothing("reflection_smoothing", self.reflection_smoothing)?;
        if !(self.initial_band_gain >= 0.0) {
            return Err(ConfigError::invalid(
                "initial_band_gain",
                format!("must be >= 0, got {}", self.initial_band_gain),
            ));
        }
        Ok(())
    }
}

/// Audio constants (compile-time, sized for device callbacks)
pub mod audio_constants {
    /// Largest block the renderer processes at once (frames)
    /// Bigger device buffers are split into blocks of this size
    pub const MAX_BLOCK_FRAMES: usize = 4096;
}

/// Offline recording configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds); `None` renders the whole clip
    pub duration_secs: Option<f32>,

    /// Output WAV path
    pub output_path: PathBuf,

    /// Simulation frame rate (frames per second)
    pub frame_rate_hz: u32,

    /// Output channel count (the mono coloration is broadcast to each)
    pub channels: u16,
}

impl RecordingConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            duration_secs: None,
            output_path: output_path.into(),
            frame_rate_hz: 60,
            channels: 2,
        }
    }

    /// Audio samples rendered per simulation frame (at least 1)
    pub fn samples_per_frame(&self, sample_rate_hz: u32) -> usize {
        (sample_rate_hz / self.frame_rate_hz.max(1)).max(1) as usize
    }

    /// Total number of audio frames to render for a clip of `clip_len` samples
    pub fn total_samples(&self, clip_len: usize, sample_rate_hz: u32) -> usize {
        match self.duration_secs {
            Some(secs) => (secs.max(0.0) * sample_rate_hz as f32).ceil() as usize,
            None => clip_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_line_len() {
        let params = RenderParams::default();
        assert_eq!(params.delay_line_len(44100.0), 44100);
        assert_eq!(params.delay_line_len(48000.0), 48000);

        let tiny = RenderParams {
            max_delay_s: 1e-9,
            ..Default::default()
        };
        assert_eq!(tiny.delay_line_len(44100.0), 1);
    }

    #[test]
    fn test_recording_frames() {
        let mut config = RecordingConfig::new("out.wav");
        assert_eq!(config.samples_per_frame(48000), 800);
        assert_eq!(config.total_samples(1234, 48000), 1234);

        config.duration_secs = Some(0.5);
        assert_eq!(config.total_samples(1234, 48000), 24000);
    }
}
