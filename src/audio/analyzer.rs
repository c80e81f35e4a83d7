//! Offline FFT analysis of a loaded clip into per-band energy over time.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use tracing::debug;

use crate::params::{AnalysisParams, BandRange};

/// Per-band energy, one vector per analysis hop. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyTimeline {
    frames: Vec<Vec<f32>>,
    sample_rate_hz: f32,
    hop_size: usize,
}

impl EnergyTimeline {
    pub fn new(frames: Vec<Vec<f32>>, sample_rate_hz: f32, hop_size: usize) -> Self {
        Self {
            frames,
            sample_rate_hz,
            hop_size,
        }
    }

    /// Frame index for a playback time: `floor(t * sample_rate / hop)`
    pub fn index_at(&self, elapsed_s: f64) -> Option<usize> {
        if !(elapsed_s >= 0.0) || self.hop_size == 0 {
            return None;
        }
        Some((elapsed_s * self.sample_rate_hz as f64 / self.hop_size as f64).floor() as usize)
    }

    /// Energy vector playing at `elapsed_s`, if the clip is that long
    pub fn frame_at(&self, elapsed_s: f64) -> Option<&[f32]> {
        self.index_at(elapsed_s).and_then(|i| self.frame(i))
    }

    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate_hz
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }
}

/// Hann-windowed FFT band analyzer
pub struct SpectralAnalyzer {
    params: AnalysisParams,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl SpectralAnalyzer {
    pub fn new(params: AnalysisParams) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(params.window_size);
        let window = (0..params.window_size)
            .map(|i| hann_window(i, params.window_size))
            .collect();
        Self {
            params,
            fft,
            window,
        }
    }

    /// Band energies for every full window of `signal`.
    ///
    /// Each bin below Nyquist (DC excluded) adds its squared magnitude to
    /// the first band containing its center frequency. Energies are not
    /// normalized by bin count, so wide bands read louder.
    pub fn analyze(&self, signal: &[f32], sample_rate_hz: f32, bands: &[BandRange]) -> EnergyTimeline {
        let size = self.params.window_size;
        let hop = self.params.hop_size;
        let frame_count = self.params.frame_count(signal.len());
        let nyquist = sample_rate_hz * 0.5;

        // Band owning each spectrum bin, resolved once
        let bin_bands: Vec<Option<usize>> = (0..size / 2)
            .map(|bin| {
                let freq = self.params.bin_to_hz(bin, sample_rate_hz);
                if bin == 0 || freq > nyquist {
                    return None;
                }
                bands.iter().position(|band| band.contains(freq))
            })
            .collect();

        let mut buffer = vec![Complex::new(0.0, 0.0); size];
        let mut scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        let mut frames = Vec::with_capacity(frame_count);

        for frame in 0..frame_count {
            let offset = frame * hop;
            for (slot, (&sample, &w)) in buffer
                .iter_mut()
                .zip(signal[offset..offset + size].iter().zip(&self.window))
            {
                *slot = Complex::new(sample * w, 0.0);
            }

            self.fft.process_with_scratch(&mut buffer, &mut scratch);

            let mut energies = vec![0.0f32; bands.len()];
            for (value, band) in buffer.iter().zip(&bin_bands) {
                if let Some(band) = band {
                    energies[*band] += value.norm_sqr();
                }
            }
            frames.push(energies);
        }

        debug!(
            frames = frame_count,
            window = size,
            hop,
            "built energy timeline"
        );
        EnergyTimeline::new(frames, sample_rate_hz, hop)
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;

    fn sine(freq_hz: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_frame_count() {
        let analyzer = SpectralAnalyzer::new(AnalysisParams::default());
        let bands = SimulationParams::default().band_ranges;

        let short = analyzer.analyze(&vec![0.0; 1000], 44100.0, &bands);
        assert!(short.is_empty());

        let timeline = analyzer.analyze(&vec![0.0; 2048 + 5 * 1024], 44100.0, &bands);
        assert_eq!(timeline.len(), 5);
        assert!(timeline
            .frame(0)
            .unwrap()
            .iter()
            .all(|&e| e == 0.0));
    }

    #[test]
    fn test_tone_lands_in_its_band() {
        let analyzer = SpectralAnalyzer::new(AnalysisParams::default());
        let bands = SimulationParams::default().band_ranges;

        // 1 kHz sits in the 707..1414 Hz band (index 5)
        let timeline = analyzer.analyze(&sine(1000.0, 44100.0, 44100), 44100.0, &bands);
        let frame = timeline.frame(3).unwrap();
        let loudest = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(loudest, Some(5));
        assert!(frame[5] > 100.0 * frame[0]);
    }

    #[test]
    fn test_bins_outside_bands_are_dropped() {
        let analyzer = SpectralAnalyzer::new(AnalysisParams::default());
        let bands = [BandRange::new(5000.0, 6000.0)];

        let timeline = analyzer.analyze(&sine(200.0, 44100.0, 8192), 44100.0, &bands);
        let frame = timeline.frame(0).unwrap();
        assert_eq!(frame.len(), 1);
        assert!(frame[0] < 1.0);
    }

    #[test]
    fn test_timeline_lookup() {
        let timeline = EnergyTimeline::new(vec![vec![1.0], vec![2.0]], 44100.0, 1024);

        assert_eq!(timeline.index_at(0.0), Some(0));
        // 1024 / 44100 ≈ 0.02322 s per frame
        assert_eq!(timeline.frame_at(0.03), Some(&[2.0][..]));
        assert_eq!(timeline.frame_at(1.0), None);
        assert_eq!(timeline.index_at(-0.1), None);
    }
}
