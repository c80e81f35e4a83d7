//! Seam to the geometric propagation engine, plus a synthetic stand-in.
//!
//! The real engine traces rays through room geometry on the GPU and hands
//! back one sparse energy probe per frame. [`SyntheticRoom`] produces frames
//! of the same shape from a handful of room constants so the pipeline can
//! run without it.

use noise::{NoiseFn, Perlin};

use super::histogram::IrHistogram;

/// Speed of sound in air at 20 °C (m/s)
pub const SPEED_OF_SOUND_M_S: f32 = 343.0;

/// Raw engine output for one simulation frame
#[derive(Debug, Clone)]
pub struct PropagationFrame {
    /// Energy per (time bin, band) for this frame's probe only
    pub ir: IrHistogram,
    /// Energy per band reaching the listener this frame
    pub received: Vec<f32>,
}

impl PropagationFrame {
    pub fn new(bins: usize, bands: usize) -> Self {
        Self {
            ir: IrHistogram::new(bins, bands),
            received: vec![0.0; bands],
        }
    }
}

/// Anything that can turn an emitted spectrum into an IR probe
pub trait PropagationEngine {
    /// Trace one frame for `emitter` (energy per band) into `frame`.
    fn trace(&mut self, emitter: &[f32], frame: &mut PropagationFrame);
}

/// Room constants for [`SyntheticRoom`]
#[derive(Debug, Clone)]
pub struct RoomShape {
    /// Source to listener distance (meters)
    pub source_distance_m: f32,

    /// Extra path length per bounce (meters)
    pub mean_free_path_m: f32,

    /// Energy absorbed per bounce in the lowest band, 0..1
    pub absorption_low: f32,

    /// Energy absorbed per bounce in the highest band, 0..1
    pub absorption_high: f32,

    /// Echoes traced per frame after the direct path
    pub echoes_per_probe: usize,

    /// Path length jitter as a fraction of the mean free path
    pub jitter: f32,

    /// Perlin noise seed
    pub seed: u32,
}

impl Default for RoomShape {
    fn default() -> Self {
        Self {
            source_distance_m: 5.0,
            mean_free_path_m: 4.0,
            absorption_low: 0.1,
            absorption_high: 0.4, // Soft furnishings eat the highs
            echoes_per_probe: 12,
            jitter: 0.3,
            seed: 42,
        }
    }
}

/// Deterministic probe generator: direct path plus noisy bounce series
pub struct SyntheticRoom {
    shape: RoomShape,
    bins: usize,
    bands: usize,
    ir_sample_rate: f32,
    perlin: Perlin,
    frame_index: u64,
}

impl SyntheticRoom {
    pub fn new(shape: RoomShape, bins: usize, bands: usize, ir_sample_rate: f32) -> Self {
        Self {
            perlin: Perlin::new(shape.seed),
            shape,
            bins,
            bands,
            ir_sample_rate,
            frame_index: 0,
        }
    }

    pub fn shape(&self) -> &RoomShape {
        &self.shape
    }

    /// Time bin at which a path of `length_m` arrives
    pub fn arrival_bin(&self, length_m: f32) -> usize {
        (length_m / SPEED_OF_SOUND_M_S * self.ir_sample_rate).round() as usize
    }

    fn absorption(&self, band: usize) -> f32 {
        let t = if self.bands > 1 {
            band as f32 / (self.bands - 1) as f32
        } else {
            0.0
        };
        self.shape.absorption_low + (self.shape.absorption_high - self.shape.absorption_low) * t
    }

    fn deposit(&self, frame: &mut PropagationFrame, emitter: &[f32], length_m: f32, bounces: i32) {
        let bin = self.arrival_bin(length_m);
        let spreading = 1.0 / (4.0 * std::f32::consts::PI * length_m * length_m);
        for band in 0..self.bands {
            let emitted = emitter.get(band).copied().unwrap_or(0.0).max(0.0);
            let energy = emitted * spreading * (1.0 - self.absorption(band)).powi(bounces);
            frame.ir.add(bin, band, energy);
        }
    }
}

impl PropagationEngine for SyntheticRoom {
    fn trace(&mut self, emitter: &[f32], frame: &mut PropagationFrame) {
        if frame.ir.bins() != self.bins || frame.ir.bands() != self.bands {
            *frame = PropagationFrame::new(self.bins, self.bands);
        } else {
            frame.ir.clear();
        }

        let distance = self.shape.source_distance_m.max(0.01);
        self.deposit(frame, emitter, distance, 0);

        // Sample the noise field off the integer lattice, where Perlin is zero
        let t = self.frame_index as f64 * 0.173 + 0.5;
        for bounce in 1..=self.shape.echoes_per_probe {
            let n = self.perlin.get([t, bounce as f64 * 0.71 + 0.5]) as f32;
            let extra = self.shape.mean_free_path_m * (1.0 + self.shape.jitter * n);
            let length = distance + bounce as f32 * extra.max(0.0);
            self.deposit(frame, emitter, length, bounce as i32);
        }

        let totals = frame.ir.band_totals();
        frame.received.clear();
        frame.received.extend_from_slice(&totals);

        self.frame_index += 1;
    }
}
