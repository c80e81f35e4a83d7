//! Roomtone library - Real-time room auralization
//!
//! A propagation engine traces an emitted spectrum through a room once per
//! frame. The simulation side turns those probes into a per-band transfer
//! function and a set of discrete echoes; the audio side colours a playing
//! clip with them, sample by sample.

pub mod audio;
pub mod cli;
pub mod error;
pub mod logging;
pub mod params;
pub mod session;
pub mod sim;

pub use error::{Result, RoomtoneError};
