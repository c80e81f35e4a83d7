//! The spectrum the propagation engine treats as "currently emitted".

use std::sync::Arc;

use crate::audio::EnergyTimeline;

/// Energy-per-band vector fed to the propagation engine each frame.
///
/// Follows the loaded clip's energy timeline by playback time, or holds a
/// constant vector when no clip drives it.
#[derive(Debug, Clone)]
pub struct EmitterFeed {
    timeline: Option<Arc<EnergyTimeline>>,
    current: Vec<f32>,
}

impl EmitterFeed {
    /// Silent feed with `bands` entries
    pub fn new(bands: usize) -> Self {
        Self {
            timeline: None,
            current: vec![0.0; bands],
        }
    }

    /// Follow `timeline` from now on
    pub fn load_timeline(&mut self, timeline: Arc<EnergyTimeline>) {
        self.timeline = Some(timeline);
    }

    /// Drop the timeline and hold `energy` (truncated or zero-padded to the band count)
    pub fn set_constant(&mut self, energy: &[f32]) {
        self.timeline = None;
        for (i, value) in self.current.iter_mut().enumerate() {
            *value = energy.get(i).copied().unwrap_or(0.0);
        }
    }

    /// Pick the timeline frame for `elapsed_s` seconds of playback.
    ///
    /// Negative or out-of-range times keep the previous vector, as does a
    /// feed without a timeline.
    pub fn update(&mut self, elapsed_s: f64) {
        let Some(timeline) = &self.timeline else {
            return;
        };
        if let Some(frame) = timeline.frame_at(elapsed_s) {
            for (out, &value) in self.current.iter_mut().zip(frame) {
                *out = value;
            }
        }
    }

    /// Zero the vector (playback stopped)
    pub fn silence(&mut self) {
        self.current.fill(0.0);
    }

    pub fn current(&self) -> &[f32] {
        &self.current
    }

    pub fn has_timeline(&self) -> bool {
        self.timeline.is_some()
    }
}
