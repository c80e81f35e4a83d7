//! Room simulation parameters: frequency bands, IR accumulation, reflections.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Frequency band edges in Hz, one octave each (halving from 22.6 kHz)
pub const DEFAULT_BAND_RANGES: [(f32, f32); 10] = [
    (22.0, 44.0),
    (44.0, 88.0),
    (88.0, 177.0),
    (177.0, 354.0),
    (354.0, 707.0),
    (707.0, 1414.0),
    (1414.0, 2828.0),
    (2828.0, 5657.0),
    (5657.0, 11314.0),
    (11314.0, 22627.0),
];

/// Half-open frequency range `[low_hz, high_hz)` covered by one energy band.
///
/// Serialized as a `[low, high]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f32, f32)", into = "(f32, f32)")]
pub struct BandRange {
    pub low_hz: f32,
    pub high_hz: f32,
}

impl BandRange {
    pub const fn new(low_hz: f32, high_hz: f32) -> Self {
        Self { low_hz, high_hz }
    }

    /// Geometric center frequency (Hz)
    pub fn center_hz(&self) -> f32 {
        (self.low_hz * self.high_hz).sqrt()
    }

    /// Quality factor of a band-pass covering this range
    pub fn q(&self) -> f32 {
        self.center_hz() / (self.high_hz - self.low_hz)
    }

    pub fn contains(&self, freq_hz: f32) -> bool {
        freq_hz >= self.low_hz && freq_hz < self.high_hz
    }
}

impl From<(f32, f32)> for BandRange {
    fn from((low_hz, high_hz): (f32, f32)) -> Self {
        Self { low_hz, high_hz }
    }
}

impl From<BandRange> for (f32, f32) {
    fn from(range: BandRange) -> Self {
        (range.low_hz, range.high_hz)
    }
}

/// Parameters shared by the accumulator, extractors and smoother
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Number of frequency bands (fixed for the process lifetime)
    pub energy_bands: usize,

    /// Band edges, one `[low, high]` pair per band, ascending
    pub band_ranges: Vec<BandRange>,

    /// Leaky integrator decay applied to the accumulated IR every frame, in [0, 1)
    /// 0.9 = steady state at 10x a constant per-frame input
    pub ir_accumulation_decay: f32,

    /// Upper bound on discrete reflections sent to the renderer
    pub max_reflections: usize,

    /// Length of the direct-sound window after first arrival (seconds)
    pub direct_sound_interval: f32,

    /// Per-frame smoothing coefficient for reflection gains, in (0, 1]
    pub reflection_gain_smoothing: f32,

    /// Per-frame smoothing coefficient for reflection delays, in (0, 1]
    pub reflection_delay_smoothing: f32,

    /// Time resolution of the IR histogram (bins per second)
    pub ir_sample_rate: f32,

    /// Number of time bins in the IR histogram
    /// 44000 bins ≈ 1 s at 44.1 kHz
    pub ir_bins: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            energy_bands: DEFAULT_BAND_RANGES.len(),
            band_ranges: DEFAULT_BAND_RANGES
                .iter()
                .copied()
                .map(BandRange::from)
                .collect(),
            ir_accumulation_decay: 0.9,
            max_reflections: 16,
            direct_sound_interval: 0.005,
            reflection_gain_smoothing: 0.02,
            reflection_delay_smoothing: 0.02,
            ir_sample_rate: 44100.0,
            ir_bins: 44000,
        }
    }
}

impl SimulationParams {
    /// Validate ranges (band table matches band count, coefficients in range, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.energy_bands == 0 {
            return Err(ConfigError::invalid("energy_bands", "must be > 0"));
        }
        if self.band_ranges.len() != self.energy_bands {
            return Err(ConfigError::invalid(
                "band_ranges",
                format!(
                    "expected {} ranges, got {}",
                    self.energy_bands,
                    self.band_ranges.len()
                ),
            ));
        }
        for range in &self.band_ranges {
            if !(range.low_hz > 0.0 && range.low_hz < range.high_hz) {
                return Err(ConfigError::invalid(
                    "band_ranges",
                    format!("range [{}, {}) is empty or negative", range.low_hz, range.high_hz),
                ));
            }
        }
        if !(0.0..1.0).contains(&self.ir_accumulation_decay) {
            return Err(ConfigError::invalid(
                "ir_accumulation_decay",
                format!("must be in [0, 1), got {}", self.ir_accumulation_decay),
            ));
        }
        if self.max_reflections == 0 {
            return Err(ConfigError::invalid("max_reflections", "must be > 0"));
        }
        if !(self.direct_sound_interval >= 0.0) {
            return Err(ConfigError::invalid(
                "direct_sound_interval",
                format!("must be >= 0, got {}", self.direct_sound_interval),
            ));
        }
        check_smoothing("reflection_gain_smoothing", self.reflection_gain_smoothing)?;
        check_smoothing("reflection_delay_smoothing", self.reflection_delay_smoothing)?;
        if !(self.ir_sample_rate > 0.0) {
            return Err(ConfigError::invalid("ir_sample_rate", "must be > 0"));
        }
        if self.ir_bins == 0 {
            return Err(ConfigError::invalid("ir_bins", "must be > 0"));
        }
        let ir_length_s = self.ir_bins as f32 / self.ir_sample_rate;
        if self.direct_sound_interval > ir_length_s {
            return Err(ConfigError::invalid(
                "direct_sound_interval",
                format!(
                    "must fit the IR ({} s), got {}",
                    ir_length_s, self.direct_sound_interval
                ),
            ));
        }
        Ok(())
    }
}

/// Smoothing coefficients live in (0, 1]: 1 applies targets immediately
pub(crate) fn check_smoothing(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be in (0, 1], got {}", value),
        ))
    }
}
