//! Audio side: clip analysis, playback and the real-time room renderer.
//!
//! The analyzer turns a clip into per-band energy frames ahead of time.
//! At runtime the simulation publishes room parameters through a lock-free
//! handoff, and the renderer colours the playing clip with them on the
//! audio thread.

mod analyzer;
mod clip;
mod filters;
mod handoff;
mod offline;
mod renderer;
mod source;
mod system;

// Re-export public types
pub use analyzer::{hann_window, EnergyTimeline, SpectralAnalyzer};
pub use clip::AudioClip;
pub use filters::{BandpassFilter, BiquadCoeffs, FilterBank};
pub use handoff::{room_channel, RoomParams, RoomPublisher, RoomSubscriber};
pub use offline::{render_clip, render_offline, OfflineRender};
pub use renderer::{RenderState, RoomRenderer};
pub use source::{PlaybackState, SourcePlayer, Transport};
pub use system::{AudioSystem, ClipRenderer};
