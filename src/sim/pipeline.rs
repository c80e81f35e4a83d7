//! Per-frame auralization pipeline: raw probe in, room update out.

use tracing::trace;

use super::accumulator::IrAccumulator;
use super::propagation::PropagationFrame;
use super::reflections::{Reflection, ReflectionExtractor};
use super::smoother::ReflectionSmoother;
use super::transfer::{compute_transfer_function, normalize_received, transfer_from_received};
use super::Outcome;
use crate::params::SimulationParams;

/// Parameters for the renderer derived from one simulation frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomUpdate {
    /// Linear gain per band
    pub bands: Vec<f32>,
    /// Smoothed echoes, loudest first (by slot)
    pub reflections: Vec<Reflection>,
    /// This frame's unaccumulated gain per band at the listener
    pub listener_gains: Vec<f32>,
    /// Received energy per band, loudest band = 1.0
    pub received_levels: Vec<f32>,
}

/// Owns all state that persists between simulation frames
pub struct Auralizer {
    params: SimulationParams,
    accumulator: IrAccumulator,
    extractor: ReflectionExtractor,
    smoother: ReflectionSmoother,
    broadband: Vec<f32>,
    outcome: Outcome,
}

impl Auralizer {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            accumulator: IrAccumulator::new(params.ir_bins, params.energy_bands),
            extractor: ReflectionExtractor::new(
                params.direct_sound_interval,
                params.max_reflections,
            ),
            smoother: ReflectionSmoother::with_capacity(
                params.reflection_delay_smoothing,
                params.reflection_gain_smoothing,
                params.max_reflections,
            ),
            broadband: Vec::with_capacity(params.ir_bins),
            outcome: Outcome::NoSignal,
            params,
        }
    }

    /// Run accumulate → transfer function → reflections → smoothing.
    ///
    /// `emitter` is the spectrum the frame was traced with.
    pub fn step(&mut self, frame: &PropagationFrame, emitter: &[f32]) -> RoomUpdate {
        let sample_rate = self.params.ir_sample_rate;
        let ir = self
            .accumulator
            .accumulate(&frame.ir, self.params.ir_accumulation_decay);

        let bands = compute_transfer_function(
            ir,
            self.params.direct_sound_interval,
            sample_rate,
            emitter,
        );

        ir.broadband_into(&mut self.broadband);
        let (raw, outcome) = self
            .extractor
            .extract_with_outcome(&self.broadband, sample_rate);
        let reflections = self.smoother.smooth(&raw);

        if outcome != self.outcome {
            trace!(?outcome, frames = self.accumulator.frames(), "room outcome changed");
        }
        self.outcome = outcome;

        RoomUpdate {
            bands,
            reflections,
            listener_gains: transfer_from_received(&frame.received, emitter),
            received_levels: normalize_received(&frame.received),
        }
    }

    /// Why the last frame's reflection set is (or is not) empty
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn accumulator(&self) -> &IrAccumulator {
        &self.accumulator
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Forget the accumulated room (geometry reload)
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.smoother.clear();
        self.outcome = Outcome::NoSignal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimulationParams {
        SimulationParams {
            ir_bins: 8820,
            direct_sound_interval: 0.001,
            ir_accumulation_decay: 0.5,
            reflection_gain_smoothing: 1.0,
            reflection_delay_smoothing: 1.0,
            ..Default::default()
        }
    }

    fn frame_with(cells: &[(usize, usize, f32)]) -> PropagationFrame {
        let mut frame = PropagationFrame::new(8820, 10);
        for &(bin, band, energy) in cells {
            frame.ir.set(bin, band, energy);
        }
        frame
    }

    #[test]
    fn test_silent_frame() {
        let mut auralizer = Auralizer::new(params());
        let update = auralizer.step(&frame_with(&[]), &[1.0; 10]);
        assert_eq!(update.bands, vec![0.0; 10]);
        assert!(update.reflections.is_empty());
        assert_eq!(auralizer.outcome(), Outcome::NoSignal);
    }

    #[test]
    fn test_direct_and_echo() {
        let mut auralizer = Auralizer::new(params());
        let frame = frame_with(&[(0, 0, 4.0), (4410, 0, 1.0)]);

        let mut emitter = [0.0; 10];
        emitter[0] = 1.0;
        let update = auralizer.step(&frame, &emitter);

        assert!((update.bands[0] - 2.0).abs() < 1e-5);
        assert_eq!(update.reflections.len(), 1);
        assert!((update.reflections[0].delay - 0.1).abs() < 1e-6);
        assert!((update.reflections[0].gain - 0.5).abs() < 1e-6);
        assert_eq!(auralizer.outcome(), Outcome::Signal);
    }

    #[test]
    fn test_listener_view_from_received() {
        let mut auralizer = Auralizer::new(params());
        let mut frame = frame_with(&[(0, 0, 4.0)]);
        frame.received[0] = 4.0;
        frame.received[1] = 1.0;

        let mut emitter = [0.0; 10];
        emitter[0] = 1.0;
        emitter[1] = 4.0;
        let update = auralizer.step(&frame, &emitter);

        assert!((update.listener_gains[0] - 2.0).abs() < 1e-5);
        assert!((update.listener_gains[1] - 0.5).abs() < 1e-5);
        assert_eq!(update.received_levels[0], 1.0);
        assert_eq!(update.received_levels[1], 0.25);
        assert!(update.received_levels[2..].iter().all(|&l| l == 0.0));
    }

    #[test]
    fn test_accumulates_across_frames() {
        let mut auralizer = Auralizer::new(params());
        let frame = frame_with(&[(0, 0, 1.0)]);
        let mut emitter = [0.0; 10];
        emitter[0] = 1.0;

        // decay 0.5 → accumulated energy approaches 2.0, gain sqrt(2)
        let mut update = RoomUpdate::default();
        for _ in 0..60 {
            update = auralizer.step(&frame, &emitter);
        }
        assert!((update.bands[0] - 2.0f32.sqrt()).abs() < 1e-4);
        assert_eq!(auralizer.accumulator().frames(), 60);

        auralizer.reset();
        assert_eq!(auralizer.accumulator().frames(), 0);
    }
}
