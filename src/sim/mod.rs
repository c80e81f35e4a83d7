//! Simulation-side processing: everything that runs once per frame.
//!
//! Raw propagation probes are integrated into a persistent IR estimate,
//! from which a per-band transfer function and a set of discrete
//! reflections are derived and smoothed for the renderer.

mod accumulator;
mod emitter;
mod histogram;
mod pipeline;
mod propagation;
mod reflections;
mod smoother;
mod transfer;

// Re-export public types
pub use accumulator::IrAccumulator;
pub use emitter::EmitterFeed;
pub use histogram::IrHistogram;
pub use pipeline::{Auralizer, RoomUpdate};
pub use propagation::{
    PropagationEngine, PropagationFrame, RoomShape, SyntheticRoom, SPEED_OF_SOUND_M_S,
};
pub use reflections::{Reflection, ReflectionExtractor, REFERENCE_EPSILON};
pub use smoother::{ReflectionSmoother, SmoothedReflection};
pub use transfer::{
    compute_transfer_function, direct_arrival_bin, direct_window_bins, normalize_received,
    transfer_from_received, TRANSFER_EPSILON,
};

/// What the last extraction found.
///
/// None of these are errors: they are the expected states while sound is
/// still on its way or the estimate is too faint to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Direct sound found and usable as reference
    Signal,
    /// No energy has arrived yet
    NoSignal,
    /// Direct peak too small to normalize echoes against
    DegenerateReference,
}
