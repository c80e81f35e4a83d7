//! Audio output system: clip playback through the room renderer.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info, warn};

use super::clip::AudioClip;
use super::handoff::{room_channel, RoomPublisher};
use super::renderer::RoomRenderer;
use super::source::{SourcePlayer, Transport};
use crate::error::AudioError;
use crate::params::{audio_constants::MAX_BLOCK_FRAMES, AuralConfig};
use crate::sim::RoomUpdate;

/// Clip playback feeding the room renderer; the body of the device callback
pub struct ClipRenderer {
    player: SourcePlayer,
    renderer: RoomRenderer,
    scratch: Vec<f32>,
}

impl ClipRenderer {
    pub fn new(player: SourcePlayer, renderer: RoomRenderer) -> Self {
        Self {
            player,
            renderer,
            scratch: vec![0.0; MAX_BLOCK_FRAMES],
        }
    }

    /// Fill an interleaved device buffer.
    ///
    /// A stop (or the clip running out) clears the delay line and filter
    /// history before the next block; pause and resume keep them.
    pub fn render(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for block in data.chunks_mut(MAX_BLOCK_FRAMES * channels) {
            let frames = block.len() / channels;
            let valid = self.player.fill(&mut self.scratch[..frames]);
            if self.player.take_rewound() {
                self.renderer.reset();
            }
            self.renderer
                .process(valid.map(|n| &self.scratch[..n]), block, channels);
        }
    }

    pub fn renderer(&self) -> &RoomRenderer {
        &self.renderer
    }

    pub fn transport(&self) -> &Arc<Transport> {
        self.player.transport()
    }
}

/// Audio system owning the output stream and the simulation-side handoff
pub struct AudioSystem {
    /// Room parameter publisher (simulation thread side)
    publisher: RoomPublisher,

    /// Shared play/pause/stop control
    transport: Arc<Transport>,

    /// Device output rate (Hz)
    sample_rate_hz: u32,

    /// Device output channels
    channels: u16,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default output device and start a stream rendering `clip`.
    ///
    /// Playback starts stopped; call [`play`](Self::play).
    pub fn new(clip: &AudioClip, looping: bool, config: &AuralConfig) -> Result<Self, AudioError> {
        // Setup audio output device
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported = device.default_output_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(supported.sample_format()));
        }
        let stream_config: cpal::StreamConfig = supported.into();
        let sample_rate_hz = stream_config.sample_rate.0;
        let channels = stream_config.channels;

        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate = sample_rate_hz,
            channels,
            "audio output"
        );
        if clip.sample_rate_hz() != sample_rate_hz {
            warn!(
                clip_rate = clip.sample_rate_hz(),
                device_rate = sample_rate_hz,
                "clip is not resampled; playback pitch will shift"
            );
        }

        let simulation = &config.simulation;
        let (publisher, subscriber) =
            room_channel(simulation.band_ranges.len(), simulation.max_reflections);
        let transport = Arc::new(Transport::new(clip.sample_rate_hz()));

        // Everything the callback touches is built here, on this thread
        let player = SourcePlayer::new(clip.shared_samples(), looping, Arc::clone(&transport));
        let renderer = RoomRenderer::new(
            sample_rate_hz as f32,
            simulation,
            &config.render,
            subscriber,
        );
        let mut clip_renderer = ClipRenderer::new(player, renderer);
        let channel_count = channels as usize;

        // Build audio output stream
        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                clip_renderer.render(data, channel_count);
            },
            |err| error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;

        Ok(Self {
            publisher,
            transport,
            sample_rate_hz,
            channels,
            _stream: stream,
        })
    }

    /// Replace the clip: rebuilds the stream, which also clears the delay
    /// line and filter history.
    pub fn reload(&mut self, clip: &AudioClip, looping: bool, config: &AuralConfig) -> Result<(), AudioError> {
        self.transport.stop();
        *self = Self::new(clip, looping, config)?;
        Ok(())
    }

    /// Send the latest room parameters to the renderer
    pub fn publish(&mut self, update: &RoomUpdate) {
        self.publisher
            .publish(Some(&update.bands), Some(&update.reflections));
    }

    pub fn play(&self) {
        self.transport.play();
    }

    pub fn pause(&self) {
        self.transport.pause();
    }

    pub fn resume(&self) {
        self.transport.resume();
    }

    pub fn stop(&self) {
        self.transport.stop();
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    /// Room updates the renderer has refused so far
    pub fn rejected_updates(&self) -> u64 {
        self.publisher.rejected_count()
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
