//! Real-time room coloration: band-split EQ plus discrete echoes.
//!
//! ## Audio thread safety
//! - Filters, gain vectors, reflection slots and the delay line are all
//!   allocated in [`RoomRenderer::new`]
//! - [`RoomRenderer::process`] never allocates, locks or blocks
//! - Parameter updates arrive through a [`RoomSubscriber`] and are applied
//!   at block boundaries; between updates the last targets are reused

use super::filters::FilterBank;
use super::handoff::RoomSubscriber;
use crate::params::{RenderParams, SimulationParams};
use crate::sim::ReflectionSmoother;

/// Renderer activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// No input: output is silence and no state advances
    Idle,
    /// Consuming input and producing colored output
    Rendering,
}

/// Per-sample auralization of a mono input
pub struct RoomRenderer {
    sample_rate_hz: f32,
    filters: FilterBank,
    target_gains: Vec<f32>,
    smooth_gains: Vec<f32>,
    gain_smoothing: f32,
    max_reflections: usize,
    reflections: ReflectionSmoother,
    delay_line: Vec<f32>,
    write_index: usize,
    state: RenderState,
    subscriber: RoomSubscriber,
}

impl RoomRenderer {
    pub fn new(
        sample_rate_hz: f32,
        simulation: &SimulationParams,
        render: &RenderParams,
        subscriber: RoomSubscriber,
    ) -> Self {
        let bands = simulation.band_ranges.len();
        Self {
            sample_rate_hz,
            filters: FilterBank::new(sample_rate_hz, &simulation.band_ranges),
            target_gains: vec![render.initial_band_gain; bands],
            smooth_gains: vec![render.initial_band_gain; bands],
            gain_smoothing: render.band_gain_smoothing,
            max_reflections: simulation.max_reflections,
            reflections: ReflectionSmoother::with_capacity(
                render.reflection_smoothing,
                render.reflection_smoothing,
                simulation.max_reflections,
            ),
            delay_line: vec![0.0; render.delay_line_len(sample_rate_hz)],
            write_index: 0,
            state: RenderState::Idle,
            subscriber,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate_hz
    }

    /// Current (smoothed) band gains
    pub fn band_gains(&self) -> &[f32] {
        &self.smooth_gains
    }

    /// Latest accepted band gain targets
    pub fn target_gains(&self) -> &[f32] {
        &self.target_gains
    }

    /// Number of reflections currently being rendered
    pub fn active_reflections(&self) -> usize {
        self.reflections.len()
    }

    #[cfg(test)]
    pub(crate) fn delay_line(&self) -> &[f32] {
        &self.delay_line
    }

    /// Clear the delay line and filter history (stop, clip reload)
    pub fn reset(&mut self) {
        self.filters.reset();
        self.delay_line.fill(0.0);
        self.write_index = 0;
    }

    /// Adopt the newest snapshot, if any. Snapshots with the wrong band
    /// count are dropped whole and the previous targets stay.
    fn apply_updates(&mut self) {
        let Some(params) = self.subscriber.poll() else {
            return;
        };

        if params.bands.len() != self.target_gains.len() {
            self.subscriber.note_rejected();
            return;
        }

        self.target_gains.copy_from_slice(&params.bands);
        let keep = params.reflections.len().min(self.max_reflections);
        self.reflections.retarget(&params.reflections[..keep]);
    }

    /// Render one block.
    ///
    /// `output` is interleaved with `channels` channels; the mono result is
    /// written to every channel. Input shorter than the block is padded
    /// with silence so echoes ring out; `None` (or empty) input renders
    /// silence and goes idle.
    pub fn process(&mut self, input: Option<&[f32]>, output: &mut [f32], channels: usize) {
        self.apply_updates();

        let input = match input {
            Some(samples) if !samples.is_empty() && channels > 0 => samples,
            _ => {
                self.state = RenderState::Idle;
                output.fill(0.0);
                return;
            }
        };
        self.state = RenderState::Rendering;

        let len = self.delay_line.len();
        for (i, frame) in output.chunks_mut(channels).enumerate() {
            let x = input.get(i).copied().unwrap_or(0.0);

            for (gain, &target) in self.smooth_gains.iter_mut().zip(&self.target_gains) {
                *gain += self.gain_smoothing * (target - *gain);
            }
            self.reflections.step();

            let dry = self.filters.process_weighted(x, &self.smooth_gains);

            let mut wet = dry;
            for reflection in self.reflections.iter() {
                let delay = ((reflection.delay * self.sample_rate_hz).round() as usize).min(len - 1);
                wet += reflection.gain * self.delay_line[(self.write_index + len - delay) % len];
            }

            frame.fill(wet);

            self.delay_line[self.write_index] = dry;
            self.write_index = (self.write_index + 1) % len;
        }
    }
}
