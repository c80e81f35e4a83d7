//! Device-free rendering: simulation and renderer in lock-step, to WAV.

use std::sync::Arc;

use tracing::info;

use super::analyzer::SpectralAnalyzer;
use super::clip::AudioClip;
use super::handoff::room_channel;
use super::renderer::RoomRenderer;
use super::source::PlaybackState;
use crate::error::AudioError;
use crate::params::{AuralConfig, RecordingConfig};
use crate::session::SimulationLoop;
use crate::sim::PropagationEngine;

/// Result of an offline render
#[derive(Debug, Clone)]
pub struct OfflineRender {
    /// Mono coloured output
    pub samples: Vec<f32>,
    /// Output rate (the clip's rate)
    pub sample_rate_hz: u32,
    /// Simulation frames run
    pub frames: usize,
}

impl OfflineRender {
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate_hz.max(1) as f64
    }
}

/// Render `clip` through the room in memory.
///
/// One simulation frame runs before each block of
/// `recording.samples_per_frame` samples. Past the end of the clip the
/// input is silence, so a longer duration captures the reverb tail.
pub fn render_clip<E: PropagationEngine>(
    clip: &AudioClip,
    config: &AuralConfig,
    engine: E,
    recording: &RecordingConfig,
) -> OfflineRender {
    let sample_rate_hz = clip.sample_rate_hz();
    let simulation_params = &config.simulation;

    let analyzer = SpectralAnalyzer::new(config.analysis.clone());
    let timeline = analyzer.analyze(
        clip.samples(),
        sample_rate_hz as f32,
        &simulation_params.band_ranges,
    );

    let mut simulation = SimulationLoop::new(simulation_params.clone(), engine);
    simulation.load_timeline(Arc::new(timeline));

    let (mut publisher, subscriber) = room_channel(
        simulation_params.band_ranges.len(),
        simulation_params.max_reflections,
    );
    let mut renderer = RoomRenderer::new(
        sample_rate_hz as f32,
        simulation_params,
        &config.render,
        subscriber,
    );

    let block_len = recording.samples_per_frame(sample_rate_hz);
    let mut samples = vec![0.0f32; recording.total_samples(clip.len(), sample_rate_hz)];
    let tail = vec![0.0f32; block_len];
    let mut frames = 0;

    for (index, block) in samples.chunks_mut(block_len).enumerate() {
        let start = index * block_len;
        let elapsed_s = start as f64 / sample_rate_hz.max(1) as f64;

        let (playback, input) = match clip.samples().get(start..) {
            Some(rest) if !rest.is_empty() => (
                PlaybackState::Playing,
                &rest[..rest.len().min(block.len())],
            ),
            _ => (PlaybackState::Stopped, &tail[..block.len()]),
        };

        let update = simulation.step(playback, elapsed_s);
        publisher.publish(Some(&update.bands), Some(&update.reflections));
        renderer.process(Some(input), block, 1);
        frames += 1;
    }

    OfflineRender {
        samples,
        sample_rate_hz,
        frames,
    }
}

/// Render `clip` through the room and write the result to
/// `recording.output_path`.
pub fn render_offline<E: PropagationEngine>(
    clip: &AudioClip,
    config: &AuralConfig,
    engine: E,
    recording: &RecordingConfig,
) -> Result<OfflineRender, AudioError> {
    let render = render_clip(clip, config, engine, recording);

    AudioClip::write_wav(
        &recording.output_path,
        &render.samples,
        render.sample_rate_hz,
        recording.channels.max(1),
    )?;

    info!(
        path = %recording.output_path.display(),
        seconds = %format!("{:.2}", render.duration_s()),
        frames = render.frames,
        "offline render written"
    );
    Ok(render)
}
