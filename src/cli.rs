//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::error::ConfigError;
use crate::params::{AuralConfig, RecordingConfig};
use crate::sim::RoomShape;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "roomtone")]
#[command(about = "Real-time room auralization of an audio clip", long_about = None)]
pub struct Args {
    /// Mono (or first-channel) WAV clip to play through the room
    #[arg(long, value_name = "WAV")]
    pub input: PathBuf,

    /// TOML config file; missing fields use defaults
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Stop after this many seconds (default: end of clip)
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Simulation frames per second
    #[arg(long, value_name = "HZ", default_value = "60", value_parser = clap::value_parser!(u32).range(1..))]
    pub frame_rate: u32,

    /// Render to this WAV file instead of the audio device
    #[arg(long, value_name = "WAV")]
    pub offline: Option<PathBuf>,

    /// Loop the clip (live playback only)
    #[arg(long = "loop")]
    pub looping: bool,

    /// Source to listener distance for the synthetic room (meters)
    #[arg(long, value_name = "METERS", default_value = "5")]
    pub room_distance: f32,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Load the config file if given, else defaults
    pub fn load_config(&self) -> Result<AuralConfig, ConfigError> {
        match &self.config {
            Some(path) => {
                info!(path = %path.display(), "config");
                AuralConfig::load(path)
            }
            None => Ok(AuralConfig::default()),
        }
    }

    /// Synthetic room at the requested distance
    pub fn room_shape(&self) -> Result<RoomShape, ConfigError> {
        if !(self.room_distance > 0.0) {
            return Err(ConfigError::invalid(
                "room_distance",
                format!("must be > 0, got {}", self.room_distance),
            ));
        }
        Ok(RoomShape {
            source_distance_m: self.room_distance,
            ..Default::default()
        })
    }

    /// Create recording configuration if offline mode is enabled
    pub fn create_recording_config(&self) -> Option<RecordingConfig> {
        self.offline.as_ref().map(|path| {
            let mut config = RecordingConfig::new(path);
            config.duration_secs = self.duration;
            config.frame_rate_hz = self.frame_rate;
            config
        })
    }
}
