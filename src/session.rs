//! Simulation loop: emitter → propagation → auralizer, once per frame.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::{AudioSystem, EnergyTimeline, PlaybackState};
use crate::params::SimulationParams;
use crate::sim::{Auralizer, EmitterFeed, PropagationEngine, PropagationFrame, RoomUpdate};

/// Frame-rate side of the pipeline, independent of any audio device
pub struct SimulationLoop<E> {
    engine: E,
    emitter: EmitterFeed,
    frame: PropagationFrame,
    auralizer: Auralizer,
    frames: u64,
}

impl<E: PropagationEngine> SimulationLoop<E> {
    pub fn new(params: SimulationParams, engine: E) -> Self {
        Self {
            engine,
            emitter: EmitterFeed::new(params.energy_bands),
            frame: PropagationFrame::new(params.ir_bins, params.energy_bands),
            auralizer: Auralizer::new(params),
            frames: 0,
        }
    }

    /// Drive the emitter from a clip's energy timeline
    pub fn load_timeline(&mut self, timeline: Arc<EnergyTimeline>) {
        self.emitter.load_timeline(timeline);
    }

    pub fn emitter_mut(&mut self) -> &mut EmitterFeed {
        &mut self.emitter
    }

    /// Advance one frame for the given playback state and position.
    ///
    /// Playing follows the timeline, paused holds the last spectrum, and
    /// stopped silences a clip-driven emitter.
    pub fn step(&mut self, playback: PlaybackState, elapsed_s: f64) -> RoomUpdate {
        match playback {
            PlaybackState::Playing => self.emitter.update(elapsed_s),
            PlaybackState::Paused => {}
            PlaybackState::Stopped if self.emitter.has_timeline() => self.emitter.silence(),
            PlaybackState::Stopped => {}
        }

        self.engine.trace(self.emitter.current(), &mut self.frame);
        self.frames += 1;
        self.auralizer.step(&self.frame, self.emitter.current())
    }

    /// Latest raw propagation output
    pub fn frame(&self) -> &PropagationFrame {
        &self.frame
    }

    pub fn auralizer(&self) -> &Auralizer {
        &self.auralizer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Forget accumulated room state (geometry or clip reload).
    ///
    /// A clip-driven emitter is silenced until playback picks it up again;
    /// a constant emitter keeps its vector.
    pub fn reset(&mut self) {
        self.auralizer.reset();
        if self.emitter.has_timeline() {
            self.emitter.silence();
        }
    }
}

/// Simulation loop driving a live output device
pub struct LiveSession<E> {
    simulation: SimulationLoop<E>,
    audio: AudioSystem,
    reported_rejections: u64,
}

impl<E: PropagationEngine> LiveSession<E> {
    pub fn new(simulation: SimulationLoop<E>, audio: AudioSystem) -> Self {
        Self {
            simulation,
            audio,
            reported_rejections: 0,
        }
    }

    pub fn audio(&self) -> &AudioSystem {
        &self.audio
    }

    /// Run one simulation frame and publish its room update
    pub fn step(&mut self) -> RoomUpdate {
        let transport = self.audio.transport();
        let (state, elapsed_s) = (transport.state(), transport.elapsed_s());

        let update = self.simulation.step(state, elapsed_s);
        self.audio.publish(&update);

        let rejected = self.audio.rejected_updates();
        if rejected > self.reported_rejections {
            warn!(
                rejected = rejected - self.reported_rejections,
                "renderer dropped room updates with the wrong band count"
            );
            self.reported_rejections = rejected;
        }
        update
    }

    /// Play the clip and simulate at `frame_rate_hz` until `duration`
    /// passes or a non-looping clip ends.
    pub fn run(&mut self, frame_rate_hz: u32, duration: Option<Duration>) {
        let frame_interval = Duration::from_secs_f64(1.0 / frame_rate_hz.max(1) as f64);
        let start = Instant::now();

        self.audio.play();
        info!(frame_rate = frame_rate_hz, "simulation running");

        loop {
            let frame_start = Instant::now();
            let update = self.step();

            if self.simulation.frames() % u64::from(frame_rate_hz.max(1)) == 0 {
                debug!(
                    elapsed_s = %format!("{:.2}", self.audio.transport().elapsed_s()),
                    reflections = update.reflections.len(),
                    loudest_band = ?loudest_band(&update.received_levels),
                    outcome = ?self.simulation.auralizer().outcome(),
                    "frame"
                );
            }

            if duration.is_some_and(|d| start.elapsed() >= d) {
                break;
            }
            if self.audio.transport().state() == PlaybackState::Stopped {
                info!("clip finished");
                break;
            }

            if let Some(rest) = frame_interval.checked_sub(frame_start.elapsed()) {
                thread::sleep(rest);
            }
        }

        self.audio.stop();
    }
}

/// Band whose received level is 1.0 after normalization
fn loudest_band(levels: &[f32]) -> Option<usize> {
    levels.iter().position(|&level| level >= 1.0)
}
