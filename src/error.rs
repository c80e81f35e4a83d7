//! Error types for configuration loading and audio I/O.
//!
//! The auralization pipeline itself has no failure modes: missing signal,
//! degenerate reference levels and malformed parameter messages all recover
//! to a safe default. Only the edges of the crate (config files, WAV files,
//! audio devices) can fail.

/// Result type alias for fallible roomtone operations.
pub type Result<T> = std::result::Result<T, RoomtoneError>;

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value outside its documented range
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Audio device and audio file errors.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// No default output device is available
    #[error("no audio output device found")]
    NoOutputDevice,

    /// Device refused to report a default config
    #[error("failed to get audio config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    /// Device only offers a sample format the renderer does not produce
    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    /// Output stream could not be created
    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Output stream could not be started or paused
    #[error("failed to control audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// WAV file could not be read or written
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// WAV file has no samples
    #[error("audio clip is empty")]
    EmptyClip,
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum RoomtoneError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}
